//! Local ONNX embeddings through fastembed

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use sitrep_llm::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, LLMError, Result};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Wraps a fastembed model. Holds loaded model weights in memory.
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbedder {
    /// Load all-MiniLM-L6-v2 (384 dimensions)
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2)
    }

    pub fn with_model(model_name: EmbeddingModel) -> Result<Self> {
        info!("Loading local embedding model {:?}", model_name);
        let model = TextEmbedding::try_new(InitOptions::new(model_name))
            .map_err(|e| LLMError::ConfigurationError(format!("failed to load model: {e}")))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        if request.input.is_empty() {
            return Ok(EmbeddingResponse {
                vectors: Vec::new(),
            });
        }

        // Inference is CPU-bound; keep it off the runtime thread
        let model = Arc::clone(&self.model);
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| LLMError::ProviderError("embedding model lock poisoned".to_string()))?;
            model
                .embed(request.input, None)
                .map_err(|e| LLMError::ProviderError(e.to_string()))
        })
        .await
        .map_err(|e| LLMError::ProviderError(format!("embedding task failed: {e}")))??;

        Ok(EmbeddingResponse { vectors })
    }

    fn name(&self) -> &'static str {
        "fastembed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "downloads model, run with --ignored"]
    async fn test_local_embedder_dimension() {
        let embedder = LocalEmbedder::new().expect("failed to init embedder");
        let response = embedder
            .embed(EmbeddingRequest::new(
                "all-MiniLM-L6-v2",
                vec!["casos de SRAG".to_string()],
            ))
            .await
            .expect("failed to embed");
        assert_eq!(response.vectors[0].len(), 384);
    }
}
