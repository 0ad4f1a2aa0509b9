//! AnkiConnect client error types.

use thiserror::Error;

/// Result type for AnkiConnect calls.
pub type AnkiConnectResult<T> = Result<T, AnkiConnectError>;

/// Failures of a single AnkiConnect call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnkiConnectError {
    /// AnkiConnect could not be reached (Anki closed, add-on missing, refused).
    #[error("Failed to connect to AnkiConnect: {0}")]
    Connection(String),

    /// The configured deadline elapsed before a response arrived.
    #[error("AnkiConnect request timed out: {0}")]
    Timeout(String),

    /// AnkiConnect answered with a non-success HTTP status.
    #[error("AnkiConnect returned HTTP {status}")]
    Http { status: u16 },

    /// AnkiConnect answered with a well-formed `error` payload.
    #[error("{0}")]
    Remote(String),

    /// The response body could not be decoded into the expected shape.
    #[error("Invalid AnkiConnect response: {0}")]
    InvalidResponse(String),
}

impl AnkiConnectError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a remote (application-level) error.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create an invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether another attempt may succeed.
    ///
    /// Remote errors are definitive answers ("deck was not found") and are
    /// never retried; neither are client-side HTTP statuses or bodies that
    /// do not decode.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Http { status } => *status >= 500,
            Self::Remote(_) | Self::InvalidResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for AnkiConnectError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Connection(e.to_string())
        }
    }
}
