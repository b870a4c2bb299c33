//! # xbridge exchange adapters
//!
//! Translation layer between canonical trading operations and exchange
//! REST APIs. Adapters build signed request descriptors and turn raw JSON
//! replies into canonical types; a [`Transport`] does the actual I/O.
//!
//! ## Architecture
//!
//! - **Request descriptors** - method, path, ordered params and headers
//! - **Signing** - HMAC-SHA256 over exactly the transmitted parameters
//! - **Money** - exact decimals bound to a currency, rounded per pair
//! - **Mapping tables** - bijective canonical/wire enum translation
//! - **Unified interface** - one [`ExchangeAdapter`] trait per exchange

#[cfg(feature = "binance")]
pub mod binance;
pub mod config;
pub mod errors;
pub mod mapping;
pub mod request;
pub mod traits;
pub mod types;

// Re-export main types
#[cfg(feature = "binance")]
pub use binance::{BinanceAdapter, BinanceConfig, Credentials};
pub use config::PairConfig;
pub use errors::{ErrorCode, ExchangeError, Result};
pub use mapping::Bijection;
pub use request::{Method, Params, RequestDescriptor, Transport};
pub use traits::ExchangeAdapter;
pub use types::*;

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "binance")]
    pub use crate::binance::{BinanceAdapter, BinanceConfig, Credentials};
    pub use crate::config::PairConfig;
    pub use crate::errors::{ErrorCode, ExchangeError, Result};
    pub use crate::request::{Method, Params, RequestDescriptor, Transport};
    pub use crate::traits::ExchangeAdapter;
    pub use crate::types::*;
    pub use xbridge_core::prelude::*;
}
