//! Canonical, exchange-agnostic trading types
//!
//! These are what the rest of a trading system sees. Exchange field names,
//! numeric id encodings and type strings never leak past the adapters.

use crate::errors::{ExchangeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xbridge_core::prelude::*;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderMode {
    Buy,
    Sell,
}

impl OrderMode {
    pub const ALL: [OrderMode; 2] = [OrderMode::Buy, OrderMode::Sell];
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderMode::Buy => write!(f, "BUY"),
            OrderMode::Sell => write!(f, "SELL"),
        }
    }
}

/// Canonical order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    /// A limit order that is rejected rather than allowed to take liquidity
    PostOnly,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::Limit, OrderType::Market, OrderType::PostOnly];

    pub fn requires_price(self) -> bool {
        !matches!(self, OrderType::Market)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::PostOnly => write!(f, "POST_ONLY"),
        }
    }
}

/// How long a resting order stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    GoodTillCanceled,
    ImmediateOrCancel,
    FillOrKill,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeInForce::GoodTillCanceled => write!(f, "GTC"),
            TimeInForce::ImmediateOrCancel => write!(f, "IOC"),
            TimeInForce::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// An order as reported by an exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub mode: OrderMode,
    pub order_type: OrderType,
    pub price: Option<Money>,
    pub volume: Money,
    pub volume_remaining: Money,
    /// Creation time in milliseconds since the epoch
    pub time_created: Option<i64>,
}

impl Order {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.time_created
            .and_then(|ms| Timestamp::from_millis(ms).to_datetime())
    }

    /// Volume already executed, `volume - volume_remaining`
    pub fn volume_filled(&self) -> Result<Money> {
        Ok(self.volume.checked_sub(&self.volume_remaining)?)
    }
}

/// Full state of a single order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    /// Executed volume, in the volume currency
    pub executed_volume: Money,
    /// `price × executed volume`, in the price currency
    pub notional: Money,
}

/// A caller's intent to place an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub mode: OrderMode,
    pub order_type: OrderType,
    pub volume: Money,
    pub price: Option<Money>,
    /// `None` lets the adapter pick the exchange default for the type
    pub time_in_force: Option<TimeInForce>,
}

impl OrderRequest {
    pub fn limit(mode: OrderMode, volume: Money, price: Money) -> Self {
        Self {
            mode,
            order_type: OrderType::Limit,
            volume,
            price: Some(price),
            time_in_force: None,
        }
    }

    pub fn post_only(mode: OrderMode, volume: Money, price: Money) -> Self {
        Self {
            order_type: OrderType::PostOnly,
            ..Self::limit(mode, volume, price)
        }
    }

    pub fn market(mode: OrderMode, volume: Money) -> Self {
        Self {
            mode,
            order_type: OrderType::Market,
            volume,
            price: None,
            time_in_force: None,
        }
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }
}

/// Acknowledgement of an accepted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    /// Present when the acknowledgement echoes the order's terms
    pub order: Option<Order>,
}

/// Available funds keyed by currency code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance(BTreeMap<String, Money>);

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `amount` under its own currency code.
    pub fn insert(&mut self, amount: Money) -> Option<Money> {
        self.0.insert(amount.currency().to_string(), amount)
    }

    pub fn get(&self, currency: &str) -> Option<&Money> {
        self.0.get(currency)
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.0.contains_key(currency)
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Money)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// 24 hour market summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub high: Money,
    pub low: Money,
    pub last: Money,
    pub volume: Money,
}

/// Order book levels exactly as the exchange sent them, `[price, quantity]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(rename = "lastUpdateId", default)]
    pub last_update_id: Option<u64>,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

impl OrderBookSnapshot {
    pub fn best_bid(&self) -> Option<&[String; 2]> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&[String; 2]> {
        self.asks.first()
    }
}

/// Per-id outcome of a fan-out order lookup
///
/// Every requested id has an entry. A failed lookup never hides the
/// successful ones; use [`MultiOrderDetails::into_all`] to treat the batch
/// atomically instead.
#[derive(Debug, Clone, Default)]
pub struct MultiOrderDetails {
    results: BTreeMap<OrderId, Result<OrderDetails>>,
}

impl MultiOrderDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `id`. A failure already recorded for the id
    /// is kept; a later success does not replace it.
    pub fn insert(&mut self, id: OrderId, result: Result<OrderDetails>) {
        match self.results.get(&id) {
            Some(Err(_)) => {}
            _ => {
                self.results.insert(id, result);
            }
        }
    }

    pub fn get(&self, id: &OrderId) -> Option<&Result<OrderDetails>> {
        self.results.get(id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.results.values().all(|r| r.is_ok())
    }

    pub fn successes(&self) -> impl Iterator<Item = (&OrderId, &OrderDetails)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().ok().map(|d| (id, d)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&OrderId, &ExchangeError)> {
        self.results
            .iter()
            .filter_map(|(id, r)| r.as_ref().err().map(|e| (id, e)))
    }

    /// All details, or the first failure in id order.
    pub fn into_all(self) -> Result<BTreeMap<OrderId, OrderDetails>> {
        self.results
            .into_iter()
            .map(|(id, r)| r.map(|d| (id, d)))
            .collect()
    }
}
