//! Exchange-specific error types
//!
//! Three families matter to callers:
//! - configuration errors, raised before anything touches the network
//! - contract errors, when a reply lacks what the adapter relies on
//! - transport errors, passed through from the transport untouched

use thiserror::Error;
use xbridge_core::MoneyError;

/// Result type for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Exchange operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// The exchange replied, but not in the shape this adapter depends on.
    #[error("{exchange} {operation}: {detail}")]
    Contract {
        exchange: String,
        operation: &'static str,
        detail: String,
    },

    /// The exchange replied with its own error payload.
    #[error("{operation} rejected by exchange ({code:?} {raw_code}): {msg}")]
    Rejected {
        operation: &'static str,
        code: ErrorCode,
        raw_code: i64,
        msg: String,
    },

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),
}

impl ExchangeError {
    pub fn contract(
        exchange: impl Into<String>,
        operation: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self::Contract {
            exchange: exchange.into(),
            operation,
            detail: detail.into(),
        }
    }

    /// True for errors that mean the exchange API no longer matches the adapter.
    pub fn is_contract_drift(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }

    /// True for errors raised locally before any request could be sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::MissingCredentials(_) | Self::InvalidOrder(_)
        )
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for ExchangeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Binance error codes the adapter distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unknown,

    // General server or network issues
    Disconnected,
    TooManyRequests,
    TimestampOutsideRecvWindow,
    InvalidSignature,

    // Request issues
    MandatoryParamMissing,
    InvalidParameter,
    BadPrecision,

    // Trading
    NewOrderRejected,
    CancelRejected,
    NoSuchOrder,
    BadApiKeyFormat,
    RejectedApiKey,
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            -1001 => ErrorCode::Disconnected,
            -1003 => ErrorCode::TooManyRequests,
            -1021 => ErrorCode::TimestampOutsideRecvWindow,
            -1022 => ErrorCode::InvalidSignature,
            -1102 => ErrorCode::MandatoryParamMissing,
            -1100 | -1101 | -1130 => ErrorCode::InvalidParameter,
            -1111 => ErrorCode::BadPrecision,
            -2010 => ErrorCode::NewOrderRejected,
            -2011 => ErrorCode::CancelRejected,
            -2013 => ErrorCode::NoSuchOrder,
            -2014 => ErrorCode::BadApiKeyFormat,
            -2015 => ErrorCode::RejectedApiKey,
            _ => ErrorCode::Unknown,
        }
    }
}

impl ErrorCode {
    /// Whether the exchange refused the request's authentication.
    pub fn is_auth_failure(self) -> bool {
        matches!(
            self,
            ErrorCode::TimestampOutsideRecvWindow
                | ErrorCode::InvalidSignature
                | ErrorCode::BadApiKeyFormat
                | ErrorCode::RejectedApiKey
        )
    }
}
