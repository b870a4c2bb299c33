//! Binance authentication and request signing
//!
//! Authenticated calls carry the API key in a header plus `timestamp` and
//! `signature` query parameters. The signature is HMAC-SHA256, hex encoded,
//! over the encoded query string immediately followed by the encoded body.

use crate::errors::{ExchangeError, Result};
use crate::request::{Params, RequestDescriptor};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Header Binance reads the API key from
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Default environment variable prefix, giving `BINANCE_API_KEY` / `BINANCE_SECRET`
pub const DEFAULT_CREDENTIAL_PREFIX: &str = "BINANCE";

/// Binance API credentials
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Load `BINANCE_API_KEY` and `BINANCE_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_prefix(DEFAULT_CREDENTIAL_PREFIX)
    }

    /// Load `<PREFIX>_API_KEY` and `<PREFIX>_SECRET`. Missing or empty
    /// variables are a configuration error.
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let api_key = read_env(&format!("{prefix}_API_KEY"))?;
        let secret = read_env(&format!("{prefix}_SECRET"))?;
        Ok(Self::new(api_key, secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn is_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.secret.is_empty()
    }

    fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn read_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ExchangeError::MissingCredentials(var.to_string())),
    }
}

/// Signature of a request's query and body parameters.
///
/// The message is `query.encode()` directly followed by `body.encode()`,
/// with no separator between the two. Parameter order matters.
pub fn signature(query: &Params, body: &Params, secret: &[u8]) -> Result<String> {
    let message = format!("{}{}", query.encode(), body.encode());

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| ExchangeError::SigningError(format!("HMAC setup failed: {e}")))?;
    mac.update(message.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Adds Binance authentication to request descriptors
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    recv_window: Option<u64>,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Result<Self> {
        if !credentials.is_valid() {
            return Err(ExchangeError::MissingCredentials(
                "api key or secret is empty".to_string(),
            ));
        }

        Ok(Self {
            credentials,
            recv_window: None,
        })
    }

    /// Ask the exchange to reject the request if it arrives more than
    /// `millis` after its timestamp.
    pub fn with_recv_window(mut self, millis: Option<u64>) -> Self {
        self.recv_window = millis;
        self
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Attach the key header, `timestamp` and `signature`.
    ///
    /// The signature covers the query (including `timestamp`) and the body
    /// exactly as they will be transmitted. A stale signature from an earlier
    /// pass is dropped first so it is never signed over.
    pub fn authenticate(&self, request: &mut RequestDescriptor, timestamp_ms: u64) -> Result<()> {
        request.headers.insert(API_KEY_HEADER, self.credentials.api_key());

        request.query.remove("signature");
        if let Some(window) = self.recv_window {
            request.query.insert("recvWindow", window);
        }
        request.query.insert("timestamp", timestamp_ms);

        let signature = signature(&request.query, &request.body, self.credentials.secret_bytes())?;
        request.query.insert("signature", signature);
        request.requires_auth = true;

        debug!("🔐 Signed request: {} {}", request.method, request.path);
        Ok(())
    }
}
