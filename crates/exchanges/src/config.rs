//! Per-trading-pair adapter configuration

use crate::errors::{ExchangeError, Result};
use serde::{Deserialize, Serialize};
use xbridge_core::money::MAX_DECIMAL_PLACES;

/// One trading pair on one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Base asset, the thing bought or sold (e.g. `BTC`)
    pub volume_currency: String,
    /// Quote asset prices are denominated in (e.g. `USDT`)
    pub currency: String,
    /// The exchange's own pair identifier (e.g. `BTCUSDT`)
    pub symbol: String,
    pub price_decimal_precision: u32,
    pub volume_decimal_precision: u32,
}

impl PairConfig {
    /// Pair whose symbol is the two codes concatenated, base first.
    pub fn new(
        volume_currency: impl Into<String>,
        currency: impl Into<String>,
        price_decimal_precision: u32,
        volume_decimal_precision: u32,
    ) -> Self {
        let volume_currency = volume_currency.into();
        let currency = currency.into();
        let symbol = format!("{volume_currency}{currency}");
        Self {
            volume_currency,
            currency,
            symbol,
            price_decimal_precision,
            volume_decimal_precision,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    pub fn btc_usdt() -> Self {
        Self::new("BTC", "USDT", 8, 6)
    }

    pub fn btc_usds() -> Self {
        Self::new("BTC", "USDS", 8, 6)
    }

    /// Fail fast on configuration no exchange call could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.volume_currency.trim().is_empty() {
            return Err(ExchangeError::Configuration("volume_currency is empty".into()));
        }
        if self.currency.trim().is_empty() {
            return Err(ExchangeError::Configuration("currency is empty".into()));
        }
        if self.volume_currency == self.currency {
            return Err(ExchangeError::Configuration(format!(
                "volume_currency and currency are both {}",
                self.currency
            )));
        }
        if self.symbol.trim().is_empty() {
            return Err(ExchangeError::Configuration("symbol is empty".into()));
        }
        for (field, dp) in [
            ("price_decimal_precision", self.price_decimal_precision),
            ("volume_decimal_precision", self.volume_decimal_precision),
        ] {
            if dp > MAX_DECIMAL_PLACES {
                return Err(ExchangeError::Configuration(format!(
                    "{field} {dp} exceeds {MAX_DECIMAL_PLACES}"
                )));
            }
        }
        Ok(())
    }
}
