//! # xbridge core
//!
//! Exchange-agnostic building blocks shared by every exchange adapter.
//!
//! - **Money** - exact decimal amounts bound to a currency code
//! - **Order ids** - opaque, lossless exchange identifiers
//! - **Clocks** - injectable wall clock for request timestamps
//! - **Logging** - one `tracing` subscriber for binaries and tests

pub mod id;
pub mod logging;
pub mod money;
pub mod timing;

pub use id::OrderId;
pub use logging::init_logging;
pub use money::{Money, MoneyError};
pub use timing::{Clock, FixedClock, PerfTimer, SystemClock, Timestamp};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::id::OrderId;
    pub use crate::logging::init_logging;
    pub use crate::money::{Money, MoneyError};
    pub use crate::timing::{Clock, FixedClock, PerfTimer, SystemClock, Timestamp};

    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}
