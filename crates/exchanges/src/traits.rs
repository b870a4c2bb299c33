//! The contract every exchange adapter fulfils
//!
//! Each operation is a pair of pure functions: build a request from
//! canonical inputs, and parse the raw reply into canonical values. The
//! caller executes requests in between, so adapters hold no I/O state.

use crate::config::PairConfig;
use crate::errors::{ExchangeError, Result};
use crate::request::{RequestDescriptor, Transport};
use crate::types::*;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;
use xbridge_core::OrderId;

pub trait ExchangeAdapter {
    /// Unique adapter name, e.g. `BINANCE_BTC_USDT`
    fn name(&self) -> &str;

    fn pair(&self) -> &PairConfig;

    fn ping_request(&self) -> Result<RequestDescriptor>;
    fn parse_ping(&self, raw: &Value) -> Result<()>;

    /// Exchange clock in milliseconds since the epoch
    fn server_time_request(&self) -> Result<RequestDescriptor>;
    fn parse_server_time(&self, raw: &Value) -> Result<u64>;

    fn ticker_request(&self) -> Result<RequestDescriptor>;
    fn parse_ticker(&self, raw: &Value) -> Result<Ticker>;

    fn order_book_request(&self, limit: Option<u32>) -> Result<RequestDescriptor>;
    fn parse_order_book(&self, raw: &Value) -> Result<OrderBookSnapshot>;

    fn balance_request(&self) -> Result<RequestDescriptor>;
    /// Exactly the pair's two currencies; either one missing is a contract error.
    fn parse_balance(&self, raw: &Value) -> Result<Balance>;

    fn open_orders_request(&self) -> Result<RequestDescriptor>;
    fn parse_open_orders(&self, raw: &Value) -> Result<Vec<Order>>;

    fn place_order_request(&self, order: &OrderRequest) -> Result<RequestDescriptor>;
    fn parse_place_order(&self, raw: &Value) -> Result<PlacedOrder>;

    fn order_details_request(&self, order_id: &OrderId) -> Result<RequestDescriptor>;
    fn parse_order_details(&self, raw: &Value) -> Result<OrderDetails>;

    fn cancel_order_request(&self, order_id: &OrderId) -> Result<RequestDescriptor>;
    /// Succeeds only if the exchange confirms the order is gone.
    fn parse_cancel_order(&self, raw: &Value) -> Result<()>;

    /// One details request per id, for exchanges without a batch endpoint.
    fn multi_order_details_requests(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<(OrderId, RequestDescriptor)>> {
        unique_ids(order_ids)
            .into_iter()
            .map(|id| Ok((id.clone(), self.order_details_request(id)?)))
            .collect()
    }

    /// Merge independently executed lookups, keeping every id's outcome.
    ///
    /// A reply describing a different order than the one asked for is
    /// recorded as a contract error under the requested id.
    fn parse_multi_order_details(
        &self,
        responses: Vec<(OrderId, Result<Value>)>,
    ) -> MultiOrderDetails {
        let mut merged = MultiOrderDetails::new();
        for (requested, response) in responses {
            let parsed = response
                .and_then(|raw| self.parse_order_details(&raw))
                .and_then(|details| {
                    if details.order.id == requested {
                        Ok(details)
                    } else {
                        Err(ExchangeError::contract(
                            self.name(),
                            "multi_order_details",
                            format!(
                                "asked for order {requested}, reply describes order {}",
                                details.order.id
                            ),
                        ))
                    }
                });
            merged.insert(requested, parsed);
        }
        merged
    }

    /// Build, execute and parse a details lookup for every id.
    ///
    /// Each request is built right before it is executed so its timestamp
    /// is fresh. Build errors (e.g. missing credentials) fail the whole call;
    /// transport and parse failures are reported per id.
    fn fetch_multi_order_details(
        &self,
        transport: &dyn Transport,
        order_ids: &[OrderId],
    ) -> Result<MultiOrderDetails> {
        let order_ids = unique_ids(order_ids);
        let mut responses = Vec::with_capacity(order_ids.len());
        for id in order_ids {
            let request = self.order_details_request(id)?;
            debug!("📡 {} {}", self.name(), request);
            responses.push((id.clone(), transport.execute(&request)));
        }
        Ok(self.parse_multi_order_details(responses))
    }
}

/// Ids in first-seen order with repeats removed, so each order is looked
/// up once and has exactly one outcome.
fn unique_ids(order_ids: &[OrderId]) -> Vec<&OrderId> {
    let mut seen = BTreeSet::new();
    order_ids.iter().filter(|id| seen.insert(*id)).collect()
}
