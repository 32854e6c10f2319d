//! Pipeline configuration
//!
//! One [`PipelineConfig`] is built per invocation (from CLI flags or a JSON file)
//! and passed explicitly into the orchestrator.

use crate::error::{ConfigError, Result};
use crate::types::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitrep_utils::RetryPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Surveillance subject, used as the news query topic
    pub topic: String,

    /// Free-text query ranked against the retrieved articles
    pub search_query: String,

    /// ISO 639-1 language of the news and of the report
    pub language: String,

    /// Explicit news window; when unset the last `window_days` days are used
    pub window: Option<DateWindow>,

    /// Length of the default news window in days
    pub window_days: u32,

    /// Maximum number of articles retrieved from the news source
    pub max_news_results: usize,

    /// Number of articles ranked into the prompt
    pub top_k: usize,

    /// Maximum prompt length in characters
    pub max_prompt_chars: usize,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Generation model identifier
    pub generation_model: String,

    /// Max tokens per generated section
    pub generation_max_tokens: u32,

    /// Sampling temperature for generation
    pub temperature: f32,

    /// Attempts per external call, including the first
    pub retry_attempts: u32,

    /// Backoff before the first retry, in milliseconds
    pub retry_initial_backoff_ms: u64,

    /// Per-call timeout for external services, in seconds
    pub call_timeout_secs: u64,

    /// Title of the generated report
    pub report_title: String,

    /// Directory the report artifact is written to
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: "SRAG".to_string(),
            search_query: "SRAG aumento de casos, taxa de vacinação, taxa de mortalidade, \
                           taxa de internação em UTI, Brasil"
                .to_string(),
            language: "pt".to_string(),
            window: None,
            window_days: 30,
            max_news_results: 20,
            top_k: 2,
            max_prompt_chars: 12_000,
            embedding_model: "text-embedding-3-small".to_string(),
            generation_model: "claude-3-5-haiku-latest".to_string(),
            generation_max_tokens: 1024,
            temperature: 0.0,
            retry_attempts: 3,
            retry_initial_backoff_ms: 500,
            call_timeout_secs: 60,
            report_title: "Relatório Técnico do Panorama de SRAG".to_string(),
            output_dir: PathBuf::from("data/processed"),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// Fields missing from the file keep their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| ConfigError::Load {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| load_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::invalid("topic", "must not be empty"));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::invalid("language", "must not be empty"));
        }
        if let Some(window) = self.window.filter(|w| !w.is_valid()) {
            return Err(ConfigError::invalid(
                "window",
                format!("start {} is after end {}", window.from, window.to),
            ));
        }

        let bounds = [
            ("window_days", self.window_days as usize),
            ("max_news_results", self.max_news_results),
            ("top_k", self.top_k),
            ("max_prompt_chars", self.max_prompt_chars),
            ("generation_max_tokens", self.generation_max_tokens as usize),
            ("retry_attempts", self.retry_attempts as usize),
            ("call_timeout_secs", self.call_timeout_secs as usize),
        ];
        for (field, value) in bounds {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than 0"));
            }
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::invalid("temperature", "must be between 0.0 and 1.0"));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(ConfigError::invalid("embedding_model", "must not be empty"));
        }
        if self.generation_model.trim().is_empty() {
            return Err(ConfigError::invalid("generation_model", "must not be empty"));
        }

        Ok(())
    }

    /// News window for a run executed on `today`
    pub fn date_window(&self, today: NaiveDate) -> DateWindow {
        self.window
            .unwrap_or_else(|| DateWindow::last_days(self.window_days, today))
    }

    /// Per-call timeout for external services
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Retry policy shared by every external call
    pub fn retry_policy(&self) -> RetryPolicy {
        let initial = Duration::from_millis(self.retry_initial_backoff_ms);
        RetryPolicy::new(self.retry_attempts, initial, initial * 16, 2.0)
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    topic: Option<String>,
    search_query: Option<String>,
    language: Option<String>,
    window: Option<DateWindow>,
    window_days: Option<u32>,
    max_news_results: Option<usize>,
    top_k: Option<usize>,
    max_prompt_chars: Option<usize>,
    embedding_model: Option<String>,
    generation_model: Option<String>,
    generation_max_tokens: Option<u32>,
    temperature: Option<f32>,
    retry_attempts: Option<u32>,
    retry_initial_backoff_ms: Option<u64>,
    call_timeout_secs: Option<u64>,
    report_title: Option<String>,
    output_dir: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set an explicit news window
    pub fn window(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn window_days(mut self, days: u32) -> Self {
        self.window_days = Some(days);
        self
    }

    pub fn max_news_results(mut self, max: usize) -> Self {
        self.max_news_results = Some(max);
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    pub fn max_prompt_chars(mut self, max: usize) -> Self {
        self.max_prompt_chars = Some(max);
        self
    }

    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = Some(model.into());
        self
    }

    pub fn generation_max_tokens(mut self, tokens: u32) -> Self {
        self.generation_max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set attempts per external call
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Set the backoff before the first retry
    pub fn retry_initial_backoff(mut self, backoff: Duration) -> Self {
        self.retry_initial_backoff_ms = Some(backoff.as_millis() as u64);
        self
    }

    /// Set the per-call timeout (whole seconds)
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            topic: self.topic.unwrap_or(defaults.topic),
            search_query: self.search_query.unwrap_or(defaults.search_query),
            language: self.language.unwrap_or(defaults.language),
            window: self.window.or(defaults.window),
            window_days: self.window_days.unwrap_or(defaults.window_days),
            max_news_results: self.max_news_results.unwrap_or(defaults.max_news_results),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            max_prompt_chars: self.max_prompt_chars.unwrap_or(defaults.max_prompt_chars),
            embedding_model: self.embedding_model.unwrap_or(defaults.embedding_model),
            generation_model: self.generation_model.unwrap_or(defaults.generation_model),
            generation_max_tokens: self
                .generation_max_tokens
                .unwrap_or(defaults.generation_max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            retry_attempts: self.retry_attempts.unwrap_or(defaults.retry_attempts),
            retry_initial_backoff_ms: self
                .retry_initial_backoff_ms
                .unwrap_or(defaults.retry_initial_backoff_ms),
            call_timeout_secs: self.call_timeout_secs.unwrap_or(defaults.call_timeout_secs),
            report_title: self.report_title.unwrap_or(defaults.report_title),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}
