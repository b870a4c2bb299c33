//! Binance adapter request/response tests using rstest
//!
//! Everything here is offline: request descriptors are inspected directly
//! and replies are canned JSON in the shapes Binance documents.

use rstest::*;
use serde_json::{json, Value};
use std::sync::Arc;
use xbridge_core::prelude::*;
use xbridge_exchanges::binance::{signature, API_KEY_HEADER};
use xbridge_exchanges::prelude::*;

const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";
const SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";
const NOW_MS: u64 = 1_499_827_319_559;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// BTC/USDT adapter with an 8/6 precision pair and a frozen clock
#[fixture]
fn adapter() -> BinanceAdapter {
    BinanceAdapter::new(
        PairConfig::btc_usdt(),
        BinanceConfig::default(),
        Credentials::new(API_KEY, SECRET),
    )
    .expect("adapter")
    .with_clock(Arc::new(FixedClock::new(NOW_MS)))
}

#[fixture]
fn public_adapter() -> BinanceAdapter {
    BinanceAdapter::public(PairConfig::btc_usdt(), BinanceConfig::default()).expect("adapter")
}

fn btc(amount: &str) -> Money {
    Money::from_str_exact(amount, "BTC").unwrap()
}

fn usdt(amount: &str) -> Money {
    Money::from_str_exact(amount, "USDT").unwrap()
}

fn order_reply(id: u64, price: &str, orig: &str, executed: &str, side: &str, kind: &str) -> Value {
    json!({
        "symbol": "BTCUSDT",
        "orderId": id,
        "orderListId": -1,
        "clientOrderId": "myOrder1",
        "price": price,
        "origQty": orig,
        "executedQty": executed,
        "cummulativeQuoteQty": "0.0",
        "status": "NEW",
        "timeInForce": "GTC",
        "type": kind,
        "side": side,
        "stopPrice": "0.0",
        "time": NOW_MS,
        "updateTime": NOW_MS,
        "isWorking": true
    })
}

// ============================================================================
// PLACE ORDER
// ============================================================================

#[rstest]
fn test_limit_buy_is_rounded_and_signed(adapter: BinanceAdapter) {
    let order = OrderRequest::limit(OrderMode::Buy, btc("0.004"), usdt("3000.12345678"));
    let req = adapter.place_order_request(&order).unwrap();

    assert_eq!(req.method, Method::Post);
    assert_eq!(req.path, "/api/v3/order");
    assert!(req.requires_auth);
    assert_eq!(
        req.body_string(),
        "symbol=BTCUSDT&side=BUY&quantity=0.004000&price=3000.12345678&type=LIMIT&timeInForce=GTC"
    );
    assert_eq!(req.headers.get(API_KEY_HEADER), Some(API_KEY));
    assert_eq!(req.query.keys().collect::<Vec<_>>(), vec!["timestamp", "signature"]);
    assert_eq!(req.query.get("timestamp"), Some("1499827319559"));

    let unsigned = Params::new().with("timestamp", NOW_MS);
    let expected = signature(&unsigned, &req.body, SECRET.as_bytes()).unwrap();
    assert_eq!(req.query.get("signature"), Some(expected.as_str()));
}

#[rstest]
#[case::limit(OrderType::Limit, Some("LIMIT"), true)]
#[case::post_only(OrderType::PostOnly, Some("LIMIT_MAKER"), false)]
fn test_priced_order_types(
    adapter: BinanceAdapter,
    #[case] order_type: OrderType,
    #[case] wire: Option<&str>,
    #[case] has_time_in_force: bool,
) {
    let order = OrderRequest {
        mode: OrderMode::Sell,
        order_type,
        volume: btc("1.23456789"),
        price: Some(usdt("100.123456789")),
        time_in_force: None,
    };
    let req = adapter.place_order_request(&order).unwrap();
    assert_eq!(req.body.get("type"), wire);
    assert_eq!(req.body.get("side"), Some("SELL"));
    assert_eq!(req.body.get("quantity"), Some("1.234568"));
    assert_eq!(req.body.get("price"), Some("100.12345679"));
    assert_eq!(req.body.contains_key("timeInForce"), has_time_in_force);
}

#[rstest]
fn test_market_order_with_price_is_refused(adapter: BinanceAdapter) {
    let mut order = OrderRequest::market(OrderMode::Buy, btc("1"));
    order.price = Some(usdt("100"));
    let err = adapter.place_order_request(&order).unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidOrder(_)));
}

#[rstest]
fn test_place_order_without_credentials(public_adapter: BinanceAdapter) {
    let order = OrderRequest::limit(OrderMode::Buy, btc("1"), usdt("100"));
    let err = public_adapter.place_order_request(&order).unwrap_err();
    assert!(matches!(err, ExchangeError::MissingCredentials(_)));
}

// ============================================================================
// ROUND TRIP THROUGH ORDER DETAILS
// ============================================================================

#[rstest]
fn test_placed_order_round_trips_through_details(adapter: BinanceAdapter) {
    let placed = adapter
        .parse_place_order(&json!({
            "symbol": "BTCUSDT",
            "orderId": 28,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "transactTime": 1507725176595u64
        }))
        .unwrap();

    let req = adapter.order_details_request(&placed.id).unwrap();
    assert_eq!(req.query.get("orderId"), Some("28"));
    assert_eq!(req.query.get("symbol"), Some("BTCUSDT"));

    let details = adapter
        .parse_order_details(&order_reply(28, "3000.12345678", "0.00400000", "0.00000000", "BUY", "LIMIT"))
        .unwrap();
    assert_eq!(details.order.id, placed.id);
    assert_eq!(details.order.mode, OrderMode::Buy);
    assert_eq!(details.order.order_type, OrderType::Limit);
    assert_eq!(details.order.volume, btc("0.004"));
    assert_eq!(details.order.price, Some(usdt("3000.12345678")));
    assert!(details.executed_volume.is_zero());
    assert!(details.notional.is_zero());
    assert_eq!(details.notional.currency(), "USDT");
}

#[rstest]
fn test_echoed_order_matches_rounded_inputs(adapter: BinanceAdapter) {
    let volume = btc("0.0041234567");
    let price = usdt("3000.123456789");
    let req = adapter
        .place_order_request(&OrderRequest::limit(OrderMode::Sell, volume.clone(), price.clone()))
        .unwrap();

    let sent_qty = req.body.get("quantity").unwrap();
    let sent_price = req.body.get("price").unwrap();
    assert_eq!(sent_qty, "0.004123");
    assert_eq!(sent_price, "3000.12345679");

    // Exchange echoes exactly what it received
    let placed = adapter
        .parse_place_order(&json!({
            "symbol": "BTCUSDT",
            "orderId": 5,
            "transactTime": NOW_MS,
            "price": sent_price,
            "origQty": sent_qty,
            "executedQty": "0.000000",
            "status": "NEW",
            "type": req.body.get("type").unwrap(),
            "side": req.body.get("side").unwrap()
        }))
        .unwrap();
    let order = placed.order.unwrap();

    let rounded_volume = volume.round_to_decimal_places(6).unwrap();
    let rounded_price = price.round_to_decimal_places(8).unwrap();
    assert_eq!(order.volume, rounded_volume);
    assert_eq!(order.price.as_ref(), Some(&rounded_price));
    assert_eq!(
        order.price.unwrap() * order.volume.amount(),
        &rounded_price * rounded_volume.amount()
    );
    assert_ne!(order.volume, volume);
}

#[rstest]
fn test_large_order_ids_are_lossless(adapter: BinanceAdapter) {
    let id = u64::MAX - 7;
    let details = adapter
        .parse_order_details(&order_reply(id, "1", "1", "1", "SELL", "LIMIT_MAKER"))
        .unwrap();
    assert_eq!(details.order.id.as_str(), id.to_string());
    assert_eq!(details.order.order_type, OrderType::PostOnly);
    assert!(details.order.volume_remaining.is_zero());
}

// ============================================================================
// BALANCE
// ============================================================================

#[rstest]
fn test_balance_keeps_only_pair_currencies(adapter: BinanceAdapter) {
    let balance = adapter
        .parse_balance(&json!({
            "makerCommission": 15,
            "canTrade": true,
            "balances": [
                {"asset": "BTC", "free": "4723846.89208129", "locked": "0.00000000"},
                {"asset": "LTC", "free": "4763368.68006011", "locked": "0.00000000"},
                {"asset": "USDT", "free": "1000.50", "locked": "12.00"}
            ]
        }))
        .unwrap();

    assert_eq!(balance.len(), 2);
    assert_eq!(balance.get("BTC"), Some(&btc("4723846.89208129")));
    assert_eq!(balance.get("USDT"), Some(&usdt("1000.50")));
    assert!(!balance.contains("LTC"));
}

#[rstest]
fn test_balance_accepts_bare_list(adapter: BinanceAdapter) {
    let balance = adapter
        .parse_balance(&json!([
            {"asset": "USDT", "free": "1"},
            {"asset": "BTC", "free": "2"}
        ]))
        .unwrap();
    assert_eq!(balance.currencies().collect::<Vec<_>>(), vec!["BTC", "USDT"]);
}

#[rstest]
#[case::no_base(json!({"balances": [{"asset": "USDT", "free": "1", "locked": "0"}]}), "BTC")]
#[case::no_quote(json!({"balances": [{"asset": "BTC", "free": "1", "locked": "0"}]}), "USDT")]
fn test_balance_missing_currency_is_contract_error(
    adapter: BinanceAdapter,
    #[case] reply: Value,
    #[case] missing: &str,
) {
    let err = adapter.parse_balance(&reply).unwrap_err();
    assert!(err.is_contract_drift());
    assert!(err.to_string().contains(missing), "{err}");
    assert!(err.to_string().contains("balance"), "{err}");
}

#[rstest]
fn test_balance_without_list_is_contract_error(adapter: BinanceAdapter) {
    let err = adapter.parse_balance(&json!({"canTrade": true})).unwrap_err();
    assert!(err.is_contract_drift());
}

// ============================================================================
// CANCEL
// ============================================================================

#[rstest]
fn test_cancel_canceled(adapter: BinanceAdapter) {
    let reply = json!({"symbol": "BTCUSDT", "orderId": 4, "status": "CANCELED"});
    assert!(adapter.parse_cancel_order(&reply).is_ok());
}

#[rstest]
#[case("CANCELLING")]
#[case("NEW")]
#[case("FILLED")]
fn test_cancel_other_status_is_contract_error(adapter: BinanceAdapter, #[case] status: &str) {
    let reply = json!({"symbol": "BTCUSDT", "orderId": 4, "status": status});
    let err = adapter.parse_cancel_order(&reply).unwrap_err();
    assert!(err.is_contract_drift());
    assert!(err.to_string().contains(status));
}

// ============================================================================
// EXCHANGE ERROR PAYLOADS
// ============================================================================

#[rstest]
#[case(-1021, ErrorCode::TimestampOutsideRecvWindow)]
#[case(-1022, ErrorCode::InvalidSignature)]
#[case(-2010, ErrorCode::NewOrderRejected)]
#[case(-2013, ErrorCode::NoSuchOrder)]
#[case(-1234, ErrorCode::Unknown)]
fn test_error_payload_on_every_operation(
    adapter: BinanceAdapter,
    #[case] raw: i64,
    #[case] expected: ErrorCode,
) {
    let reply = json!({"code": raw, "msg": "rejected"});
    let results: Vec<ExchangeError> = vec![
        adapter.parse_ping(&reply).unwrap_err(),
        adapter.parse_server_time(&reply).unwrap_err(),
        adapter.parse_ticker(&reply).unwrap_err(),
        adapter.parse_order_book(&reply).unwrap_err(),
        adapter.parse_balance(&reply).unwrap_err(),
        adapter.parse_open_orders(&reply).unwrap_err(),
        adapter.parse_place_order(&reply).unwrap_err(),
        adapter.parse_order_details(&reply).unwrap_err(),
        adapter.parse_cancel_order(&reply).unwrap_err(),
    ];

    for err in results {
        match err {
            ExchangeError::Rejected { code, raw_code, .. } => {
                assert_eq!(code, expected);
                assert_eq!(raw_code, raw);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}

// ============================================================================
// MARKET DATA
// ============================================================================

#[rstest]
fn test_ping_and_server_time_are_public(public_adapter: BinanceAdapter) {
    assert!(public_adapter.parse_ping(&json!({})).is_ok());
    let req = public_adapter.server_time_request().unwrap();
    assert_eq!(req.to_string(), "GET /api/v3/time");
    assert_eq!(
        req.url(public_adapter.base_url()).unwrap().as_str(),
        "https://api.binance.com/api/v3/time"
    );
}

#[rstest]
fn test_ticker_uses_pair_currencies(public_adapter: BinanceAdapter) {
    let ticker = public_adapter
        .parse_ticker(&json!({
            "symbol": "BTCUSDT",
            "priceChange": "-94.99999800",
            "highPrice": "100.00000000",
            "lowPrice": "0.10000000",
            "lastPrice": "4.00000200",
            "volume": "8913.30000000"
        }))
        .unwrap();
    assert_eq!(ticker.last.currency(), "USDT");
    assert_eq!(ticker.volume.currency(), "BTC");
    assert_eq!(ticker.high.try_cmp(&ticker.low).unwrap(), std::cmp::Ordering::Greater);
}

#[rstest]
fn test_order_book_request_limit_is_optional(public_adapter: BinanceAdapter) {
    assert_eq!(public_adapter.order_book_request(None).unwrap().query_string(), "symbol=BTCUSDT");
    assert_eq!(
        public_adapter.order_book_request(Some(5)).unwrap().query_string(),
        "symbol=BTCUSDT&limit=5"
    );
}

// ============================================================================
// PAIRS
// ============================================================================

#[rstest]
#[case::usdt(PairConfig::btc_usdt(), "BINANCE_BTC_USDT", "BTCUSDT")]
#[case::usds(PairConfig::btc_usds(), "BINANCE_BTC_USDS", "BTCUSDS")]
#[case::custom(PairConfig::new("ETH", "BTC", 6, 3), "BINANCE_ETH_BTC", "ETHBTC")]
fn test_one_adapter_type_serves_every_pair(
    #[case] pair: PairConfig,
    #[case] name: &str,
    #[case] symbol: &str,
) {
    let adapter = BinanceAdapter::public(pair, BinanceConfig::testnet()).unwrap();
    assert_eq!(adapter.name(), name);
    assert_eq!(adapter.pair().symbol, symbol);
    assert_eq!(adapter.ticker_request().unwrap().query.get("symbol"), Some(symbol));
}
