//! Error types for encoding, storage and search

use sitrep_core::{ClassifyError, ErrorKind};
use sitrep_llm::LLMError;
use sitrep_utils::Retryable;
use thiserror::Error;

/// Result type for the retrieval layer
pub type Result<T> = std::result::Result<T, RagError>;

/// Retrieval layer errors
#[derive(Debug, Error)]
pub enum RagError {
    /// Embedding provider call failed
    #[error("Encoding failed: {0}")]
    Encoding(#[from] LLMError),

    /// Provider answered, but not with one usable vector per input
    #[error("Malformed embedding response: {0}")]
    MalformedEmbedding(String),

    /// Vector length differs from the run's fixed dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl Retryable for RagError {
    fn is_retryable(&self) -> bool {
        match self {
            RagError::Encoding(e) => e.is_retryable(),
            RagError::MalformedEmbedding(_) | RagError::DimensionMismatch { .. } => false,
        }
    }
}

impl ClassifyError for RagError {
    fn kind(&self) -> ErrorKind {
        match self {
            RagError::Encoding(LLMError::AuthenticationFailed | LLMError::ConfigurationError(_)) => {
                ErrorKind::Configuration
            }
            RagError::Encoding(_) | RagError::MalformedEmbedding(_) => ErrorKind::Encoding,
            RagError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
        }
    }
}
