//! Offline feature-hashing embedder
//!
//! Deterministic bag-of-words vectors: every lower-cased alphanumeric token is
//! hashed (FNV-1a) into one of `dimension` buckets with a hash-derived sign, then
//! the vector is L2-normalised. No model, no network. Good enough to rank news by
//! shared vocabulary when no embedding service is available.

use async_trait::async_trait;
use sitrep_llm::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, Result};

/// Default dimension, matching all-MiniLM-L6-v2
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIMENSION)
    }
}

impl HashingEmbedder {
    /// Create an embedder producing `dimension`-length vectors (at least 1)
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed one text
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        Ok(EmbeddingResponse {
            vectors: request.input.iter().map(|t| self.embed_text(t)).collect(),
        })
    }

    fn name(&self) -> &'static str {
        "hashing"
    }
}
