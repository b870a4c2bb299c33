//! Binance spot adapter
//!
//! One [`BinanceAdapter`] serves any trading pair; the pair is a
//! [`PairConfig`] value, not a type. Credentials are supplied when the
//! adapter is built and never change afterwards.

pub mod auth;
pub mod rest;
pub mod types;

use crate::config::PairConfig;
use crate::errors::{ExchangeError, Result};
use crate::mapping::Bijection;
use crate::request::RequestDescriptor;
use crate::types::{OrderMode, OrderType};
use std::sync::Arc;
use tracing::info;
use xbridge_core::{Clock, PerfTimer, SystemClock};

pub use auth::{Credentials, RequestSigner, API_KEY_HEADER, signature};
pub use rest::BinanceConfig;

/// Request builder and response parser for one Binance trading pair
pub struct BinanceAdapter {
    pair: PairConfig,
    config: BinanceConfig,
    name: String,
    friendly_name: String,
    signer: Option<RequestSigner>,
    clock: Arc<dyn Clock>,
    order_types: Bijection<OrderType>,
    sides: Bijection<OrderMode>,
}

impl BinanceAdapter {
    /// Adapter able to build authenticated requests.
    pub fn new(pair: PairConfig, config: BinanceConfig, credentials: Credentials) -> Result<Self> {
        let signer = RequestSigner::new(credentials)?.with_recv_window(config.recv_window);
        Self::build(pair, config, Some(signer))
    }

    /// Adapter with credentials read from `<credential_prefix>_API_KEY` and
    /// `<credential_prefix>_SECRET`.
    pub fn from_env(pair: PairConfig, config: BinanceConfig) -> Result<Self> {
        let credentials = Credentials::from_env_with_prefix(&config.credential_prefix)?;
        Self::new(pair, config, credentials)
    }

    /// Adapter for public market data only. Authenticated builds fail with
    /// [`ExchangeError::MissingCredentials`].
    pub fn public(pair: PairConfig, config: BinanceConfig) -> Result<Self> {
        Self::build(pair, config, None)
    }

    fn build(pair: PairConfig, config: BinanceConfig, signer: Option<RequestSigner>) -> Result<Self> {
        pair.validate()?;
        config.validate()?;

        let name = format!("BINANCE_{}_{}", pair.volume_currency, pair.currency);
        let friendly_name = format!("Binance {}-{}", pair.volume_currency, pair.currency);

        info!("🚀 Initializing {}", friendly_name);
        info!("   Symbol: {}", pair.symbol);
        info!("   Base URL: {}", config.base_url);
        info!("   Authenticated: {}", signer.is_some());

        Ok(Self {
            order_types: types::order_type_table()?,
            sides: types::side_table()?,
            pair,
            config,
            name,
            friendly_name,
            signer,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for request timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    /// Authenticate `request` with a timestamp taken now.
    fn signed(&self, mut request: RequestDescriptor) -> Result<RequestDescriptor> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::MissingCredentials(format!(
                "{} has no credentials for {} {}",
                self.name, request.method, request.path
            ))
        })?;

        let _timer = PerfTimer::start(format!("{}_sign_{}", self.name, request.path));
        signer.authenticate(&mut request, self.clock.now_ms())?;
        Ok(request)
    }
}

impl std::fmt::Debug for BinanceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceAdapter")
            .field("name", &self.name)
            .field("pair", &self.pair)
            .field("config", &self.config)
            .field("authenticated", &self.signer.is_some())
            .finish()
    }
}
