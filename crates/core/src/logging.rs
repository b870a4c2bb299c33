//! Unified logging integration
//!
//! All crates log through `tracing`. Binaries and tests call
//! [`init_logging`] once to install a formatting subscriber.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Install the global `tracing` subscriber. Safe to call more than once.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .finish();

        // Another subscriber may already be installed by the host application.
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::info!("📝 Initialized tracing logging");
        }
    });
}

/// Log an order lifecycle step
#[macro_export]
macro_rules! log_order {
    ($action:expr, $order_id:expr, $symbol:expr) => {
        tracing::info!(order_id = %$order_id, symbol = %$symbol, "📋 ORDER {}", $action);
    };
}

/// Log a response that did not match what the adapter expects from the exchange
#[macro_export]
macro_rules! log_contract_drift {
    ($exchange:expr, $operation:expr, $detail:expr) => {
        tracing::warn!(
            exchange = %$exchange,
            operation = %$operation,
            "❌ exchange contract drift: {}",
            $detail
        );
    };
}
