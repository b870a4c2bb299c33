//! Binance wire formats and canonical mapping tables
//!
//! Only the fields the adapter reads are declared; everything else in a
//! reply is ignored. Amounts stay as strings until they are bound to a
//! currency, so no float ever touches them.

use crate::errors::Result;
use crate::mapping::Bijection;
use crate::types::{OrderMode, OrderType};
use serde::Deserialize;
use xbridge_core::OrderId;

/// Order types whose wire form requires a `timeInForce`
pub const TIME_IN_FORCE_TYPES: &[&str] = &["LIMIT"];

/// `status` of a successfully canceled order
pub const CANCELED_STATUS: &str = "CANCELED";

pub fn order_type_table() -> Result<Bijection<OrderType>> {
    Bijection::new(
        "order type",
        &[
            (OrderType::Limit, "LIMIT"),
            (OrderType::Market, "MARKET"),
            (OrderType::PostOnly, "LIMIT_MAKER"),
        ],
    )
}

pub fn side_table() -> Result<Bijection<OrderMode>> {
    Bijection::new("side", &[(OrderMode::Buy, "BUY"), (OrderMode::Sell, "SELL")])
}

/// Order ids arrive as JSON numbers but are accepted as strings too
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for OrderId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => OrderId::from(n),
            WireId::Text(s) => OrderId::from(s),
        }
    }
}

/// `{"code": -2010, "msg": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorPayload {
    pub code: i64,
    pub msg: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// 24 hour ticker statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker24hr {
    #[serde(rename = "highPrice")]
    pub high_price: String,
    #[serde(rename = "lowPrice")]
    pub low_price: String,
    #[serde(rename = "lastPrice")]
    pub last_price: String,
    pub volume: String,
}

/// Account information, reduced to its balances
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub balances: Vec<AssetBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    /// Available, not locked in open orders
    pub free: String,
    #[serde(default)]
    pub locked: Option<String>,
}

/// Shape shared by the open-orders list and the order query
#[derive(Debug, Clone, Deserialize)]
pub struct QueryOrderResponse {
    #[serde(rename = "orderId")]
    pub order_id: WireId,
    pub price: String,
    #[serde(rename = "origQty")]
    pub orig_qty: String,
    #[serde(rename = "executedQty")]
    pub executed_qty: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    /// Quote amount actually spent or received
    #[serde(rename = "cummulativeQuoteQty", default)]
    pub cummulative_quote_qty: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
}

/// New order acknowledgement. `ACK` replies carry only the id; `RESULT`
/// and `FULL` replies echo the order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderResponse {
    #[serde(rename = "orderId", default)]
    pub order_id: Option<WireId>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(rename = "origQty", default)]
    pub orig_qty: Option<String>,
    #[serde(rename = "executedQty", default)]
    pub executed_qty: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(rename = "type", default)]
    pub order_type: Option<String>,
    #[serde(rename = "transactTime", default)]
    pub transact_time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderResponse {
    #[serde(rename = "orderId", default)]
    pub order_id: Option<WireId>,
    #[serde(default)]
    pub status: Option<String>,
}
