//! Request building benchmarks
//!
//! Measures the local cost of one exchange call: parameter encoding,
//! HMAC signing, money rounding and reply parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use std::sync::Arc;
use xbridge_core::prelude::*;
use xbridge_exchanges::binance::signature;
use xbridge_exchanges::prelude::*;

fn adapter() -> BinanceAdapter {
    BinanceAdapter::new(
        PairConfig::btc_usdt(),
        BinanceConfig::default(),
        Credentials::new("key", "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j"),
    )
    .expect("adapter")
    .with_clock(Arc::new(FixedClock::new(1_499_827_319_559)))
}

fn bench_signature(c: &mut Criterion) {
    let query = Params::new()
        .with("symbol", "LTCBTC")
        .with("side", "BUY")
        .with("type", "LIMIT")
        .with("timeInForce", "GTC");
    let body = Params::new()
        .with("quantity", 1)
        .with("price", "0.1")
        .with("recvWindow", 5000)
        .with("timestamp", 1_499_827_319_559u64);

    c.bench_function("hmac_sha256_signature", |b| {
        b.iter(|| signature(black_box(&query), black_box(&body), b"secret"))
    });
}

fn bench_place_order_request(c: &mut Criterion) {
    let adapter = adapter();
    let order = OrderRequest::limit(
        OrderMode::Buy,
        Money::from_str_exact("0.004", "BTC").expect("volume"),
        Money::from_str_exact("3000.12345678", "USDT").expect("price"),
    );

    c.bench_function("place_order_request", |b| {
        b.iter(|| adapter.place_order_request(black_box(&order)))
    });
}

fn bench_rounding(c: &mut Criterion) {
    let amount = Money::from_str_exact("3000.123456785", "USDT").expect("amount");
    c.bench_function("round_to_decimal_places", |b| {
        b.iter(|| black_box(&amount).round_to_decimal_places(8))
    });
}

fn bench_parse_order_details(c: &mut Criterion) {
    let adapter = adapter();
    let reply = json!({
        "symbol": "BTCUSDT",
        "orderId": 28,
        "price": "3000.12345678",
        "origQty": "0.004000",
        "executedQty": "0.001000",
        "status": "PARTIALLY_FILLED",
        "type": "LIMIT",
        "side": "BUY",
        "time": 1_499_827_319_559u64
    });

    c.bench_function("parse_order_details", |b| {
        b.iter(|| adapter.parse_order_details(black_box(&reply)))
    });
}

criterion_group!(
    benches,
    bench_signature,
    bench_place_order_request,
    bench_rounding,
    bench_parse_order_details
);
criterion_main!(benches);
