//! Error types for newsdesk.

use thiserror::Error;

/// Failure while retrieving or parsing a feed document.
///
/// Every variant is recoverable from the aggregator's point of view: a
/// failed fetch is answered with the demo corpus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The URL was rejected before any request was made.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),

    /// The document exceeded the configured size cap.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured maximum in bytes.
        max: u64,
    },

    /// Neither the RSS nor the generic feed parser accepted the document.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Common error type for newsdesk.
#[derive(Error, Debug)]
pub enum NewsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Feed retrieval error.
    #[error("feed error: {0}")]
    Fetch(#[from] FetchError),

    /// Cache or counter store error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("store error: {0}")]
    Store(String),

    /// Ranking service error.
    #[error("ranking error: {0}")]
    Ranking(String),
}

impl From<sqlx::Error> for NewsError {
    fn from(e: sqlx::Error) -> Self {
        NewsError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for NewsError {
    fn from(e: serde_json::Error) -> Self {
        NewsError::Store(format!("serialization failed: {e}"))
    }
}

/// Result type alias for newsdesk operations.
pub type Result<T> = std::result::Result<T, NewsError>;
