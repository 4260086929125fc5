//! Error types for the dashboard assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the dashboard assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Data service rejected or failed a request
    #[error("store error: {0}")]
    Store(String),

    /// Data service could not be reached at all
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Text generation error
    #[error("generation error: {0}")]
    Generation(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the remote service was not reachable
    /// (connection refused, DNS failure, timeout) rather than a rejected request
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
