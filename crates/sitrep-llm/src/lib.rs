//! Provider abstraction layer for sitrep
//!
//! This crate provides provider-agnostic abstractions for the two model services
//! the pipeline talks to:
//!
//! - Message and completion types for report generation
//! - [`LLMProvider`] for text generation
//! - [`EmbeddingProvider`] for text embeddings
//! - Concrete HTTP providers (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

pub use completion::{CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, LLMProvider};

#[cfg(any(feature = "anthropic", feature = "openai"))]
pub mod providers;
