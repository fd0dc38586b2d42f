//! Error Types
//!
//! Error hierarchy for the request sender and the OAuth2 client.
//!
//! HTTP status codes are deliberately absent here: a 4xx/5xx response from a
//! provider is returned to the caller as an ordinary body, and only
//! transport-level failures (connect, timeout, DNS) surface as
//! [`TransportError`].

use std::time::Duration;
use thiserror::Error;

use crate::types::EndpointKind;

/// Root error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed url: {url}")]
    MalformedUrl { url: String },
}

/// Configuration error, always surfaced synchronously and never retried.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("required endpoint is not configured: {endpoint}")]
    MissingEndpoint { endpoint: EndpointKind },

    #[error("MAC access tokens are not implemented")]
    MacTokensUnsupported,

    #[error("cookie jar file {path} could not be used: {message}")]
    CookieJar { path: String, message: String },
}

/// Transport-level failure reported by the HTTP layer.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("request could not be built: {message}")]
    InvalidRequest { message: String },

    #[error("failed to read response body: {message}")]
    BodyRead { message: String },
}

impl TransportError {
    /// Stable numeric code, mirroring libcurl's numbering. `0` is reserved
    /// for the success sentinel exposed by the sender accessors.
    pub fn code(&self) -> u32 {
        match self {
            Self::ConnectionFailed { .. } => 7,
            Self::Timeout { .. } => 28,
            Self::InvalidRequest { .. } => 3,
            Self::BodyRead { .. } => 23,
        }
    }
}

/// Result type for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
