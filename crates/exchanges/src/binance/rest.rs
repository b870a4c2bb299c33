//! Binance REST operations
//!
//! Each operation builds a [`RequestDescriptor`] and parses the JSON reply
//! into canonical types. Replies that lack what an operation depends on are
//! contract errors naming the operation and the missing piece.

use super::BinanceAdapter;
use super::types::*;
use crate::config::PairConfig;
use crate::errors::{ErrorCode, ExchangeError, Result};
use crate::request::{Params, RequestDescriptor};
use crate::traits::ExchangeAdapter;
use crate::types::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use xbridge_core::prelude::*;
use xbridge_core::{log_contract_drift, log_order};

const PING: &str = "/api/v3/ping";
const SERVER_TIME: &str = "/api/v3/time";
const TICKER_24HR: &str = "/api/v3/ticker/24hr";
const DEPTH: &str = "/api/v3/depth";
const ACCOUNT: &str = "/api/v3/account";
const OPEN_ORDERS: &str = "/api/v3/openOrders";
const ORDER: &str = "/api/v3/order";

/// Longest receive window Binance accepts, in milliseconds
pub const MAX_RECV_WINDOW: u64 = 60_000;

/// Binance endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinanceConfig {
    pub base_url: String,
    pub testnet: bool,
    /// Sent as `recvWindow` on authenticated requests when set
    pub recv_window: Option<u64>,
    /// Credentials are read from `<prefix>_API_KEY` and `<prefix>_SECRET`
    pub credential_prefix: String,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            testnet: false,
            recv_window: None,
            credential_prefix: super::auth::DEFAULT_CREDENTIAL_PREFIX.to_string(),
        }
    }
}

impl BinanceConfig {
    pub fn testnet() -> Self {
        Self {
            base_url: "https://testnet.binance.vision".to_string(),
            testnet: true,
            ..Default::default()
        }
    }

    /// Defaults overridden by `BINANCE_TESTNET`, `BINANCE_BASE_URL` and
    /// `BINANCE_RECV_WINDOW` when set.
    pub fn from_env() -> Result<Self> {
        let testnet = match std::env::var("BINANCE_TESTNET") {
            Ok(v) => v.parse::<bool>().map_err(|_| {
                ExchangeError::Configuration(format!("BINANCE_TESTNET is not a bool: {v:?}"))
            })?,
            Err(_) => false,
        };
        let mut config = if testnet { Self::testnet() } else { Self::default() };

        if let Ok(url) = std::env::var("BINANCE_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(window) = std::env::var("BINANCE_RECV_WINDOW") {
            let window = window.parse::<u64>().map_err(|_| {
                ExchangeError::Configuration(format!("BINANCE_RECV_WINDOW is not an integer: {window:?}"))
            })?;
            config.recv_window = Some(window);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    pub fn with_credential_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.credential_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if let Some(window) = self.recv_window {
            if window == 0 || window > MAX_RECV_WINDOW {
                return Err(ExchangeError::Configuration(format!(
                    "recv_window {window} must be within 1..={MAX_RECV_WINDOW}"
                )));
            }
        }
        if self.credential_prefix.is_empty() {
            return Err(ExchangeError::Configuration("credential_prefix is empty".into()));
        }
        Ok(())
    }
}

impl BinanceAdapter {
    fn drift(&self, operation: &'static str, detail: impl Into<String>) -> ExchangeError {
        let detail = detail.into();
        log_contract_drift!(self.name, operation, detail);
        ExchangeError::contract(&self.name, operation, detail)
    }

    /// Binance reports failures as `{"code": .., "msg": ..}`.
    fn check_error_payload(&self, operation: &'static str, raw: &Value) -> Result<()> {
        let Some(obj) = raw.as_object() else {
            return Ok(());
        };
        if !(obj.contains_key("code") && obj.contains_key("msg")) {
            return Ok(());
        }
        let payload = ApiErrorPayload::deserialize(raw)
            .map_err(|e| self.drift(operation, format!("malformed error payload: {e}")))?;
        let code = ErrorCode::from(payload.code);
        warn!(
            exchange = %self.name,
            operation,
            code = payload.code,
            "exchange rejected request: {}",
            payload.msg
        );
        Err(ExchangeError::Rejected {
            operation,
            code,
            raw_code: payload.code,
            msg: payload.msg,
        })
    }

    fn decode<T: DeserializeOwned>(&self, operation: &'static str, raw: &Value) -> Result<T> {
        self.check_error_payload(operation, raw)?;
        T::deserialize(raw).map_err(|e| self.drift(operation, format!("unexpected reply: {e}")))
    }

    fn money(&self, operation: &'static str, field: &str, amount: &str, currency: &str) -> Result<Money> {
        Money::from_str_exact(amount, currency).map_err(|_| {
            self.drift(operation, format!("field `{field}` is not a decimal: {amount:?}"))
        })
    }

    fn mode(&self, operation: &'static str, side: &str) -> Result<OrderMode> {
        self.sides
            .to_canonical(side)
            .ok_or_else(|| self.drift(operation, format!("unmapped side {side:?}")))
    }

    fn order_type(&self, operation: &'static str, wire: &str) -> Result<OrderType> {
        self.order_types
            .to_canonical(wire)
            .ok_or_else(|| self.drift(operation, format!("unmapped order type {wire:?}")))
    }

    fn order_from_wire(&self, operation: &'static str, wire: &QueryOrderResponse) -> Result<Order> {
        let pair = &self.pair;
        let volume = self.money(operation, "origQty", &wire.orig_qty, &pair.volume_currency)?;
        let executed = self.money(operation, "executedQty", &wire.executed_qty, &pair.volume_currency)?;
        let volume_remaining = self.remaining(operation, &volume, &executed)?;
        let order_type = self.order_type(operation, &wire.order_type)?;

        // Binance reports price 0 for market orders
        let price = if order_type.requires_price() {
            Some(self.money(operation, "price", &wire.price, &pair.currency)?)
        } else {
            None
        };

        Ok(Order {
            id: wire.order_id.clone().into(),
            mode: self.mode(operation, &wire.side)?,
            order_type,
            price,
            volume,
            volume_remaining,
            time_created: wire.time,
        })
    }

    /// `volume - executed`, which must not go negative.
    fn remaining(&self, operation: &'static str, volume: &Money, executed: &Money) -> Result<Money> {
        let remaining = volume
            .checked_sub(executed)
            .map_err(|e| self.drift(operation, format!("origQty - executedQty: {e}")))?;
        if remaining.is_negative() {
            return Err(self.drift(
                operation,
                format!("executedQty {} exceeds origQty {}", executed.amount(), volume.amount()),
            ));
        }
        Ok(remaining)
    }

    fn symbol_params(&self) -> Params {
        Params::new().with("symbol", &self.pair.symbol)
    }

    fn order_params(&self, order_id: &OrderId) -> Result<Params> {
        if order_id.as_str().trim().is_empty() {
            return Err(ExchangeError::InvalidOrder("order id is empty".into()));
        }
        Ok(self.symbol_params().with("orderId", order_id))
    }

    /// Check, round and encode an order into the place-order body.
    ///
    /// Rounding happens here, before anything is signed, so the transmitted
    /// amounts are exactly the configured precision.
    fn place_order_params(&self, order: &OrderRequest) -> Result<Params> {
        let pair = &self.pair;

        if order.volume.currency() != pair.volume_currency {
            return Err(ExchangeError::InvalidOrder(format!(
                "volume is in {}, {} trades {}",
                order.volume.currency(),
                pair.symbol,
                pair.volume_currency
            )));
        }
        let volume = order.volume.round_to_decimal_places(pair.volume_decimal_precision)?;
        if volume.is_zero() || volume.is_negative() {
            return Err(ExchangeError::InvalidOrder(format!(
                "volume {} is not positive at {} decimal places",
                order.volume, pair.volume_decimal_precision
            )));
        }

        let price = match (&order.price, order.order_type.requires_price()) {
            (Some(price), true) => {
                if price.currency() != pair.currency {
                    return Err(ExchangeError::InvalidOrder(format!(
                        "price is in {}, {} is priced in {}",
                        price.currency(),
                        pair.symbol,
                        pair.currency
                    )));
                }
                let rounded = price.round_to_decimal_places(pair.price_decimal_precision)?;
                if rounded.is_zero() || rounded.is_negative() {
                    return Err(ExchangeError::InvalidOrder(format!(
                        "price {} is not positive at {} decimal places",
                        price, pair.price_decimal_precision
                    )));
                }
                Some(rounded)
            }
            (None, true) => {
                return Err(ExchangeError::InvalidOrder(format!(
                    "{} orders need a price",
                    order.order_type
                )));
            }
            (Some(_), false) => {
                return Err(ExchangeError::InvalidOrder(format!(
                    "{} orders take no price",
                    order.order_type
                )));
            }
            (None, false) => None,
        };

        let wire_type = self.order_types.to_exchange(order.order_type)?;
        let time_in_force = match (order.time_in_force, TIME_IN_FORCE_TYPES.contains(&wire_type)) {
            (Some(tif), true) => Some(tif),
            (None, true) => Some(TimeInForce::GoodTillCanceled),
            (Some(tif), false) => {
                return Err(ExchangeError::InvalidOrder(format!(
                    "{} orders do not take time in force {tif}",
                    order.order_type
                )));
            }
            (None, false) => None,
        };

        let mut params = self
            .symbol_params()
            .with("side", self.sides.to_exchange(order.mode)?)
            .with("quantity", volume.amount_string());
        if let Some(price) = &price {
            params.insert("price", price.amount_string());
        }
        params.insert("type", wire_type);
        if let Some(tif) = time_in_force {
            params.insert("timeInForce", tif);
        }
        Ok(params)
    }
}

impl ExchangeAdapter for BinanceAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn pair(&self) -> &PairConfig {
        &self.pair
    }

    fn ping_request(&self) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::get(PING))
    }

    fn parse_ping(&self, raw: &Value) -> Result<()> {
        self.check_error_payload("ping", raw)
    }

    fn server_time_request(&self) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::get(SERVER_TIME))
    }

    fn parse_server_time(&self, raw: &Value) -> Result<u64> {
        let time: ServerTime = self.decode("server_time", raw)?;
        Ok(time.server_time)
    }

    fn ticker_request(&self) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::get(TICKER_24HR).with_query(self.symbol_params()))
    }

    fn parse_ticker(&self, raw: &Value) -> Result<Ticker> {
        const OP: &str = "ticker";
        let wire: Ticker24hr = self.decode(OP, raw)?;
        let pair = &self.pair;

        Ok(Ticker {
            high: self.money(OP, "highPrice", &wire.high_price, &pair.currency)?,
            low: self.money(OP, "lowPrice", &wire.low_price, &pair.currency)?,
            last: self.money(OP, "lastPrice", &wire.last_price, &pair.currency)?,
            volume: self.money(OP, "volume", &wire.volume, &pair.volume_currency)?,
        })
    }

    fn order_book_request(&self, limit: Option<u32>) -> Result<RequestDescriptor> {
        let mut query = self.symbol_params();
        if let Some(limit) = limit {
            query.insert("limit", limit);
        }
        Ok(RequestDescriptor::get(DEPTH).with_query(query))
    }

    fn parse_order_book(&self, raw: &Value) -> Result<OrderBookSnapshot> {
        self.decode("order_book", raw)
    }

    fn balance_request(&self) -> Result<RequestDescriptor> {
        self.signed(RequestDescriptor::get(ACCOUNT))
    }

    fn parse_balance(&self, raw: &Value) -> Result<Balance> {
        const OP: &str = "balance";
        let entries: Vec<AssetBalance> = match raw {
            Value::Array(_) => self.decode(OP, raw)?,
            _ => self.decode::<AccountInfo>(OP, raw)?.balances,
        };

        let pair = &self.pair;
        let mut volume_available = None;
        let mut price_available = None;

        for entry in &entries {
            let slot = if entry.asset == pair.volume_currency {
                &mut volume_available
            } else if entry.asset == pair.currency {
                &mut price_available
            } else {
                continue;
            };
            if slot.is_some() {
                return Err(self.drift(OP, format!("balance for {} listed twice", entry.asset)));
            }
            *slot = Some(self.money(OP, "free", &entry.free, &entry.asset)?);
        }

        let missing: Vec<&str> = [
            (&volume_available, pair.volume_currency.as_str()),
            (&price_available, pair.currency.as_str()),
        ]
        .into_iter()
        .filter(|(found, _)| found.is_none())
        .map(|(_, currency)| currency)
        .collect();

        match (volume_available, price_available) {
            (Some(volume), Some(price)) => {
                let mut balance = Balance::new();
                balance.insert(volume);
                balance.insert(price);
                Ok(balance)
            }
            _ => Err(self.drift(
                OP,
                format!("missing expected balances: {}", missing.join(", ")),
            )),
        }
    }

    fn open_orders_request(&self) -> Result<RequestDescriptor> {
        self.signed(RequestDescriptor::get(OPEN_ORDERS).with_query(self.symbol_params()))
    }

    fn parse_open_orders(&self, raw: &Value) -> Result<Vec<Order>> {
        const OP: &str = "open_orders";
        let wire: Vec<QueryOrderResponse> = self.decode(OP, raw)?;
        wire.iter().map(|o| self.order_from_wire(OP, o)).collect()
    }

    fn place_order_request(&self, order: &OrderRequest) -> Result<RequestDescriptor> {
        let body = self.place_order_params(order)?;
        debug!("📋 {} place order {}", self.name, body.encode());
        self.signed(RequestDescriptor::post(ORDER).with_body(body))
    }

    fn parse_place_order(&self, raw: &Value) -> Result<PlacedOrder> {
        const OP: &str = "place_order";
        let ack: NewOrderResponse = self.decode(OP, raw)?;
        let id: OrderId = ack
            .order_id
            .clone()
            .map(OrderId::from)
            .ok_or_else(|| self.drift(OP, "response does not contain an order id"))?;

        let order = match (&ack.side, &ack.order_type, &ack.orig_qty, &ack.executed_qty) {
            (Some(side), Some(order_type), Some(orig_qty), Some(executed_qty)) => {
                let order_type = self.order_type(OP, order_type)?;
                let price = match &ack.price {
                    Some(p) if order_type.requires_price() => {
                        Some(self.money(OP, "price", p, &self.pair.currency)?)
                    }
                    _ => None,
                };
                let volume = self.money(OP, "origQty", orig_qty, &self.pair.volume_currency)?;
                let executed = self.money(OP, "executedQty", executed_qty, &self.pair.volume_currency)?;
                Some(Order {
                    id: id.clone(),
                    mode: self.mode(OP, side)?,
                    order_type,
                    price,
                    volume_remaining: self.remaining(OP, &volume, &executed)?,
                    volume,
                    time_created: ack.transact_time,
                })
            }
            _ => None,
        };

        log_order!("PLACED", id, self.pair.symbol);
        Ok(PlacedOrder { id, order })
    }

    fn order_details_request(&self, order_id: &OrderId) -> Result<RequestDescriptor> {
        self.signed(RequestDescriptor::get(ORDER).with_query(self.order_params(order_id)?))
    }

    fn parse_order_details(&self, raw: &Value) -> Result<OrderDetails> {
        const OP: &str = "order_details";
        let wire: QueryOrderResponse = self.decode(OP, raw)?;
        let order = self.order_from_wire(OP, &wire)?;
        let executed_volume =
            self.money(OP, "executedQty", &wire.executed_qty, &self.pair.volume_currency)?;

        // price is a Money, the executed quantity only a scalar factor
        let notional = match (&order.price, &wire.cummulative_quote_qty) {
            (Some(price), _) => price.checked_mul(executed_volume.amount()).map_err(|e| {
                self.drift(OP, format!("price x executedQty is not representable: {e}"))
            })?,
            (None, Some(quote)) => self.money(OP, "cummulativeQuoteQty", quote, &self.pair.currency)?,
            (None, None) => Money::zero(&self.pair.currency),
        };

        Ok(OrderDetails {
            order,
            executed_volume,
            notional,
        })
    }

    fn cancel_order_request(&self, order_id: &OrderId) -> Result<RequestDescriptor> {
        self.signed(RequestDescriptor::delete(ORDER).with_body(self.order_params(order_id)?))
    }

    fn parse_cancel_order(&self, raw: &Value) -> Result<()> {
        const OP: &str = "cancel_order";
        let reply: CancelOrderResponse = self.decode(OP, raw)?;
        match reply.status.as_deref() {
            Some(CANCELED_STATUS) => {
                if let Some(id) = reply.order_id {
                    log_order!("CANCELED", OrderId::from(id), self.pair.symbol);
                }
                Ok(())
            }
            Some(other) => Err(self.drift(
                OP,
                format!("canceled order does not have canceled status, got {other:?}"),
            )),
            None => Err(self.drift(OP, "response does not contain a status")),
        }
    }
}
