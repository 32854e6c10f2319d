//! Error types for news retrieval

use sitrep_core::{ClassifyError, ErrorKind};
use sitrep_utils::Retryable;
use std::time::Duration;
use thiserror::Error;

/// Result type for news retrieval
pub type Result<T> = std::result::Result<T, NewsError>;

/// News retrieval errors
#[derive(Debug, Error)]
pub enum NewsError {
    /// Request never reached the source or the connection dropped
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request did not complete within the per-call timeout
    #[error("News request timed out after {0:?}")]
    Timeout(Duration),

    /// Source answered with a 5xx status
    #[error("News source error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Response body could not be understood
    #[error("Malformed news response: {0}")]
    Malformed(String),

    /// Source quota exhausted
    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimitExceeded { provider: String, message: String },

    /// API key missing, invalid or disabled
    #[error("News source rejected the API key: {0}")]
    Unauthorized(String),

    /// Source rejected the query itself
    #[error("News source rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },

    /// Offline article snapshot could not be loaded
    #[error("Failed to load news snapshot {path}: {reason}")]
    Snapshot { path: String, reason: String },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Retryable for NewsError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            NewsError::Network(_)
                | NewsError::Timeout(_)
                | NewsError::ServerError { .. }
                | NewsError::Malformed(_)
                | NewsError::RateLimitExceeded { .. }
        )
    }
}

impl ClassifyError for NewsError {
    fn kind(&self) -> ErrorKind {
        match self {
            NewsError::RateLimitExceeded { .. } => ErrorKind::RateLimit,
            NewsError::Unauthorized(_) | NewsError::ConfigError(_) => ErrorKind::Configuration,
            _ => ErrorKind::Retrieval,
        }
    }
}
