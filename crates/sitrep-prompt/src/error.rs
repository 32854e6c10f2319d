//! Error types for prompt operations

use sitrep_core::{ClassifyError, ErrorKind};
use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur while assembling or rendering prompts
#[derive(Error, Debug)]
pub enum PromptError {
    /// The metrics summary alone does not fit the prompt budget
    #[error("Metrics summary is {len} characters, prompt budget is {max}")]
    MetricsTooLong { len: usize, max: usize },

    /// Metrics, chart list and the news header together do not fit
    #[error("Fixed prompt content is {len} characters, prompt budget is {max}")]
    FixedContentTooLong { len: usize, max: usize },

    /// Template not found for the specified language
    #[error("Template '{name}' not found for language '{language}'")]
    TemplateNotFound { name: String, language: String },

    /// Template parsing failed
    #[error("Failed to parse template '{name}' for language '{language}': {detail}")]
    TemplateParseFailed {
        name: String,
        language: String,
        detail: String,
    },

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// No templates provided when building
    #[error("No templates provided for '{0}'")]
    NoTemplatesProvided(String),
}

impl ClassifyError for PromptError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Assembly
    }
}

impl sitrep_utils::Retryable for PromptError {
    fn is_retryable(&self) -> bool {
        false
    }
}
