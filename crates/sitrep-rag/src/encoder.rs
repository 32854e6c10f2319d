//! Embedding encoder
//!
//! Maps text to [`EmbeddingVector`]s through an [`EmbeddingProvider`]. Within one
//! run the encoder guarantees:
//!
//! - identical text always yields the identical vector (encodings are memoised)
//! - empty text maps to the embedding of [`EMPTY_TEXT_PLACEHOLDER`]
//! - every vector has the dimension fixed by the first one

use crate::error::{RagError, Result};
use sitrep_core::EmbeddingVector;
use sitrep_llm::{EmbeddingProvider, EmbeddingRequest, LLMError};
use sitrep_utils::RetryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Text embedded in place of empty or whitespace-only input
pub const EMPTY_TEXT_PLACEHOLDER: &str = "[empty]";

/// Memoising, dimension-checking front end to an embedding provider
pub struct EmbeddingEncoder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    retry: RetryPolicy,
    timeout: Duration,
    cache: HashMap<String, EmbeddingVector>,
    dimension: Option<usize>,
}

impl EmbeddingEncoder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(60),
            cache: HashMap::new(),
            dimension: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-call timeout for provider requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Dimension fixed by the first encoded vector, if any
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Encode one text
    pub async fn encode(&mut self, text: &str) -> Result<EmbeddingVector> {
        let mut vectors = self.encode_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::MalformedEmbedding("no vector returned".to_string()))
    }

    /// Encode several texts, one vector per text in input order
    ///
    /// Texts already encoded in this run are served from memory; the rest go to
    /// the provider in a single request.
    #[instrument(skip(self, texts), fields(model = %self.model, texts = texts.len()))]
    pub async fn encode_batch(&mut self, texts: &[&str]) -> Result<Vec<EmbeddingVector>> {
        let keys: Vec<&str> = texts.iter().map(|t| cache_key(t)).collect();

        let mut pending: Vec<String> = Vec::new();
        for key in &keys {
            if !self.cache.contains_key(*key) && !pending.iter().any(|p| p == key) {
                pending.push((*key).to_string());
            }
        }

        if !pending.is_empty() {
            debug!(
                "Encoding {} new text(s), {} cached",
                pending.len(),
                keys.len() - pending.len()
            );
            let vectors = self.request(&pending).await?;
            for vector in &vectors {
                self.check_dimension(vector)?;
            }
            self.cache.extend(pending.into_iter().zip(vectors));
        }

        keys.iter()
            .map(|key| {
                self.cache.get(*key).cloned().ok_or_else(|| {
                    RagError::MalformedEmbedding(format!("missing vector for '{key}'"))
                })
            })
            .collect()
    }

    async fn request(&self, input: &[String]) -> Result<Vec<EmbeddingVector>> {
        let provider = &self.provider;
        let model = &self.model;
        let timeout = self.timeout;

        let response = self
            .retry
            .execute("embed", || {
                let request = EmbeddingRequest::new(model.clone(), input.to_vec());
                async move {
                    tokio::time::timeout(timeout, provider.embed(request))
                        .await
                        .map_err(|_| LLMError::Timeout(timeout))?
                }
            })
            .await?;

        if response.vectors.len() != input.len() {
            return Err(RagError::MalformedEmbedding(format!(
                "expected {} vectors, got {}",
                input.len(),
                response.vectors.len()
            )));
        }
        if response.vectors.iter().any(Vec::is_empty) {
            return Err(RagError::MalformedEmbedding(
                "provider returned an empty vector".to_string(),
            ));
        }

        Ok(response.vectors.into_iter().map(EmbeddingVector::new).collect())
    }

    fn check_dimension(&mut self, vector: &EmbeddingVector) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != vector.dimension() => Err(RagError::DimensionMismatch {
                expected,
                actual: vector.dimension(),
            }),
            Some(_) => Ok(()),
            None => {
                self.dimension = Some(vector.dimension());
                Ok(())
            }
        }
    }
}

fn cache_key(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_TEXT_PLACEHOLDER
    } else {
        text
    }
}
