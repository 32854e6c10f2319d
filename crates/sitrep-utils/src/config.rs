//! Credential loading
//!
//! API keys are supplied out of band through the environment. They are read once
//! at startup and handed to the clients explicitly; nothing below the binary reads
//! environment variables.

use thiserror::Error;

/// Environment variable holding the NewsAPI key
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
/// Environment variable holding the Anthropic key
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the OpenAI (or compatible) key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// A required credential was not supplied
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing credential: {0} is not set")]
pub struct MissingCredential(pub &'static str);

/// API credentials for the external services
#[derive(Clone, Default)]
pub struct Credentials {
    /// NewsAPI key
    pub news_api_key: Option<String>,
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,
    /// OpenAI-compatible API key
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("news_api_key", &mask(&self.news_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("openai_api_key", &mask(&self.openai_api_key))
            .finish()
    }
}

impl Credentials {
    /// Read every known key from the environment; empty values count as unset
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            news_api_key: read(NEWS_API_KEY_VAR),
            anthropic_api_key: read(ANTHROPIC_API_KEY_VAR),
            openai_api_key: read(OPENAI_API_KEY_VAR),
        }
    }

    /// NewsAPI key, or an error naming the variable
    pub fn require_news(&self) -> Result<&str, MissingCredential> {
        self.news_api_key
            .as_deref()
            .ok_or(MissingCredential(NEWS_API_KEY_VAR))
    }

    /// Anthropic key, or an error naming the variable
    pub fn require_anthropic(&self) -> Result<&str, MissingCredential> {
        self.anthropic_api_key
            .as_deref()
            .ok_or(MissingCredential(ANTHROPIC_API_KEY_VAR))
    }

    /// OpenAI key, or an error naming the variable
    pub fn require_openai(&self) -> Result<&str, MissingCredential> {
        self.openai_api_key
            .as_deref()
            .ok_or(MissingCredential(OPENAI_API_KEY_VAR))
    }
}
