//! Error types for the orchestrator and its collaborators

use crate::orchestrator::AgentState;
use sitrep_core::{ClassifyError, ConfigError, ErrorKind, Stage};
use sitrep_utils::Retryable;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for orchestrator operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors surfaced by the orchestrator
#[derive(Error, Debug)]
pub enum AgentError {
    /// A pipeline stage failed; the run is over and nothing was written
    #[error("Stage '{stage}' failed ({kind}): {message}")]
    StageFailed {
        stage: Stage,
        kind: ErrorKind,
        message: String,
    },

    /// An operation was called in the wrong state
    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: AgentState,
    },

    /// Invalid configuration or missing collaborator
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl AgentError {
    /// Wrap a stage error, keeping its kind
    pub fn stage<E: ClassifyError + Display>(stage: Stage, err: E) -> Self {
        AgentError::StageFailed {
            stage,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Stage a failed run stopped at
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            AgentError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl ClassifyError for AgentError {
    fn kind(&self) -> ErrorKind {
        match self {
            AgentError::StageFailed { kind, .. } => *kind,
            AgentError::InvalidState { .. } | AgentError::Configuration(_) => {
                ErrorKind::Configuration
            }
        }
    }
}

impl Retryable for AgentError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Failures of the metrics component
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to read metrics snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metrics snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metrics snapshot {0} has neither summary text nor indicators")]
    Empty(PathBuf),
}

impl ClassifyError for MetricsError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Metrics
    }
}

/// Failures of the chart component
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart image {0} not found")]
    Missing(PathBuf),

    #[error("Chart image {0} is empty")]
    Empty(PathBuf),

    #[error("Failed to inspect chart image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClassifyError for ChartError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Charts
    }
}

/// Failures while writing the report artifact
#[derive(Error, Debug)]
pub enum ReportAssemblyError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report writer task failed: {0}")]
    Task(String),
}

impl ClassifyError for ReportAssemblyError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ReportAssembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keeps_kind_and_message() {
        let err = AgentError::stage(Stage::Charts, ChartError::Missing(PathBuf::from("a.png")));
        assert_eq!(err.kind(), ErrorKind::Charts);
        assert_eq!(err.failed_stage(), Some(Stage::Charts));
        assert_eq!(
            err.to_string(),
            "Stage 'charts' failed (ChartError): Chart image a.png not found"
        );
    }

    #[test]
    fn test_invalid_state_message() {
        let err = AgentError::InvalidState {
            operation: "run",
            state: AgentState::AwaitingConfirmation,
        };
        assert_eq!(err.to_string(), "Cannot run while awaiting confirmation");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
