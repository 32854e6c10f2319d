//! Error kinds shared across the pipeline
//!
//! Each crate owns its own error enum. The orchestrator only needs to know which
//! kind of failure happened and at which stage, so every crate error maps onto an
//! [`ErrorKind`] through [`ClassifyError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias for sitrep-core
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Kind of failure surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// News source unreachable or returned a malformed response
    Retrieval,
    /// News source quota exhausted
    RateLimit,
    /// Embedding model failed or rejected the input
    Encoding,
    /// Vector of the wrong dimension reached the vector store
    DimensionMismatch,
    /// Prompt could not be assembled within the length budget
    Assembly,
    /// Report generation failed after retries or the model kept declining
    Generation,
    /// Metrics component failed
    Metrics,
    /// Chart component failed
    Charts,
    /// Report document could not be written
    ReportAssembly,
    /// Invalid configuration or missing credentials
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Retrieval => "RetrievalError",
            ErrorKind::RateLimit => "RateLimitError",
            ErrorKind::Encoding => "EncodingError",
            ErrorKind::DimensionMismatch => "DimensionMismatchError",
            ErrorKind::Assembly => "AssemblyError",
            ErrorKind::Generation => "GenerationError",
            ErrorKind::Metrics => "MetricsError",
            ErrorKind::Charts => "ChartError",
            ErrorKind::ReportAssembly => "ReportAssemblyError",
            ErrorKind::Configuration => "ConfigurationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a crate error onto the shared taxonomy
pub trait ClassifyError {
    fn kind(&self) -> ErrorKind;
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Metrics,
    Charts,
    Retrieval,
    Search,
    Prompt,
    Generation,
    Assembly,
}

impl Stage {
    /// Every stage in execution order
    pub const ALL: [Stage; 7] = [
        Stage::Metrics,
        Stage::Charts,
        Stage::Retrieval,
        Stage::Search,
        Stage::Prompt,
        Stage::Generation,
        Stage::Assembly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Metrics => "metrics",
            Stage::Charts => "charts",
            Stage::Retrieval => "retrieval",
            Stage::Search => "search",
            Stage::Prompt => "prompt",
            Stage::Generation => "generation",
            Stage::Assembly => "assembly",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value
    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// A configuration file could not be read or parsed
    #[error("failed to load configuration from {path}: {reason}")]
    Load { path: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl ClassifyError for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}
