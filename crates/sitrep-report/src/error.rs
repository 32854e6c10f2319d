//! Error types for report generation

use sitrep_core::{ClassifyError, ErrorKind, SectionKind};
use sitrep_llm::LLMError;
use sitrep_prompt::PromptError;
use sitrep_utils::Retryable;
use thiserror::Error;

/// Result type for report generation
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors that end a generation run
///
/// No partial report exists once one of these is returned.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The provider failed and retries were exhausted or pointless
    #[error("Section '{section}' failed after {attempts} attempt(s): {source}")]
    Provider {
        section: SectionKind,
        attempts: u32,
        #[source]
        source: LLMError,
    },

    /// The model declined to write the section twice
    #[error("Model declined to write section '{section}'")]
    Declined { section: SectionKind },

    /// The model answered with no text twice
    #[error("Model returned no text for section '{section}'")]
    EmptyResponse { section: SectionKind },

    /// A section prompt could not be rendered
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] PromptError),
}

impl GenerationError {
    /// Section the failure happened in, if it got that far
    pub fn section(&self) -> Option<SectionKind> {
        match self {
            GenerationError::Provider { section, .. }
            | GenerationError::Declined { section }
            | GenerationError::EmptyResponse { section } => Some(*section),
            GenerationError::Prompt(_) => None,
        }
    }
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Provider { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

impl ClassifyError for GenerationError {
    fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Provider { source, .. } => source.kind(),
            GenerationError::Prompt(e) => e.kind(),
            GenerationError::Declined { .. } | GenerationError::EmptyResponse { .. } => {
                ErrorKind::Generation
            }
        }
    }
}
