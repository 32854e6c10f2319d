//! Concrete provider implementations
//!
//! Each provider is behind its own feature flag.

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicProvider;

#[cfg(feature = "openai")]
pub use openai::{OpenAIConfig, OpenAIProvider};
