//! Error types for provider operations

use sitrep_core::{ClassifyError, ErrorKind};
use sitrep_utils::Retryable;
use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while calling a generation or embedding provider
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Provider answered with a 5xx status
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// The call did not finish within the per-call timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured limit
            LLMError::Timeout(Duration::ZERO)
        } else {
            LLMError::HttpError(err)
        }
    }
}

impl LLMError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => LLMError::AuthenticationFailed,
            429 => LLMError::RateLimitExceeded(body),
            400 | 422 => LLMError::InvalidRequest(body),
            404 => LLMError::ModelNotFound(model.to_string()),
            500..=599 => LLMError::ServerError {
                status,
                message: body,
            },
            _ => LLMError::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

impl Retryable for LLMError {
    fn is_retryable(&self) -> bool {
        match self {
            LLMError::RateLimitExceeded(_) | LLMError::ServerError { .. } | LLMError::Timeout(_) => {
                true
            }
            LLMError::HttpError(e) => e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

impl ClassifyError for LLMError {
    fn kind(&self) -> ErrorKind {
        match self {
            LLMError::AuthenticationFailed | LLMError::ConfigurationError(_) => {
                ErrorKind::Configuration
            }
            _ => ErrorKind::Generation,
        }
    }
}
