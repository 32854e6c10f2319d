//! Similarity search over a news corpus

use crate::encoder::EmbeddingEncoder;
use crate::error::Result;
use crate::store::VectorStore;
use sitrep_core::{NewsArticle, SimilarityResult, VectorStoreEntry};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Encoder plus the vector store it fills
///
/// Owns the run's [`VectorStore`]; results are resolved through
/// [`store`](Self::store).
pub struct SimilaritySearcher {
    encoder: EmbeddingEncoder,
    store: VectorStore,
}

impl SimilaritySearcher {
    pub fn new(encoder: EmbeddingEncoder) -> Self {
        Self {
            encoder,
            store: VectorStore::new(),
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub fn encoder(&self) -> &EmbeddingEncoder {
        &self.encoder
    }

    /// Rank `corpus` against `query`, returning at most `k` results
    ///
    /// Articles not yet in the store are embedded (title and description) and
    /// inserted; articles already stored are not re-encoded. Encoder errors are
    /// returned unchanged.
    #[instrument(skip(self, query, corpus), fields(corpus = corpus.len()))]
    pub async fn search(
        &mut self,
        query: &str,
        corpus: &[NewsArticle],
        k: usize,
    ) -> Result<Vec<SimilarityResult>> {
        let query_vector = self.encoder.encode(query).await?;
        self.index(corpus).await?;

        let results = self.store.query(&query_vector, k)?;
        info!(
            "Selected {} of {} stored article(s)",
            results.len(),
            self.store.len()
        );
        for result in &results {
            debug!("#{} {} (score {:.3})", result.rank, result.article_id, result.score);
        }
        Ok(results)
    }

    /// Embed and store every article of `corpus` not already stored
    async fn index(&mut self, corpus: &[NewsArticle]) -> Result<()> {
        let mut seen = HashSet::new();
        let fresh: Vec<&NewsArticle> = corpus
            .iter()
            .filter(|a| !self.store.contains(&a.id()) && seen.insert(a.id()))
            .collect();

        if fresh.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = fresh.iter().map(|a| a.embedding_text()).collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self.encoder.encode_batch(&text_refs).await?;

        for (article, vector) in fresh.into_iter().zip(vectors) {
            self.store
                .insert(VectorStoreEntry::new(article.clone(), vector))?;
        }
        debug!("Vector store holds {} article(s)", self.store.len());
        Ok(())
    }
}
