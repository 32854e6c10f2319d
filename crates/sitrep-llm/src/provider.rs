//! Provider trait definitions

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for text generation providers
///
/// Implementations of this trait provide access to different model services
/// (e.g., Anthropic, OpenAI-compatible endpoints).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "anthropic", "openai")
    fn name(&self) -> &str;
}

/// Request to embed a batch of texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// Embedding model identifier
    pub model: String,
    /// Texts to embed, in order
    pub input: Vec<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
        }
    }
}

/// One vector per input text, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub vectors: Vec<Vec<f32>>,
}

/// Trait for embedding providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed every input text
    ///
    /// Implementations must return exactly one vector per input, in order.
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, StopReason, TokenUsage};

    #[tokio::test]
    async fn test_mock_llm_provider() {
        let mut mock = MockLLMProvider::new();
        mock.expect_complete().times(1).returning(|_| {
            Ok(CompletionResponse {
                message: Message::assistant("ok"),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        });
        mock.expect_name().return_const("mock".to_string());

        let request = CompletionRequest::builder("m")
            .add_message(Message::user("hi"))
            .build();
        let response = mock.complete(request).await.unwrap();
        assert_eq!(response.text(), "ok");
        assert_eq!(mock.name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_embedding_provider() {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed()
            .withf(|req| req.input.len() == 2)
            .returning(|req| {
                Ok(EmbeddingResponse {
                    vectors: req.input.iter().map(|_| vec![0.0, 1.0]).collect(),
                })
            });

        let response = mock
            .embed(EmbeddingRequest::new(
                "e",
                vec!["a".to_string(), "b".to_string()],
            ))
            .await
            .unwrap();
        assert_eq!(response.vectors.len(), 2);
    }
}
