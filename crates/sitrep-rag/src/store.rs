//! In-memory vector store
//!
//! Holds the embedded articles of one run. Brute-force cosine search is plenty for
//! the handful of articles a run retrieves.

use crate::error::{RagError, Result};
use sitrep_core::{ArticleId, ArticleLookup, EmbeddingVector, NewsArticle, SimilarityResult, VectorStoreEntry};
use std::cmp::Ordering;
use std::collections::HashMap;

/// What an insert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An entry with the same article id was replaced in place
    Replaced,
}

/// Vector store owning every entry of the run
#[derive(Debug, Default)]
pub struct VectorStore {
    entries: Vec<VectorStoreEntry>,
    index: HashMap<ArticleId, usize>,
    dimension: Option<usize>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that only accepts vectors of `dimension`
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn contains(&self, id: &ArticleId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ArticleId) -> Option<&VectorStoreEntry> {
        self.index.get(id).map(|&slot| &self.entries[slot])
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[VectorStoreEntry] {
        &self.entries
    }

    /// Insert or replace an entry
    ///
    /// An entry for an article id already present replaces the old one and keeps
    /// its insertion slot.
    pub fn insert(&mut self, entry: VectorStoreEntry) -> Result<InsertOutcome> {
        let actual = entry.vector.dimension();
        match self.dimension {
            Some(expected) if expected != actual => {
                return Err(RagError::DimensionMismatch { expected, actual });
            }
            Some(_) => {}
            None => self.dimension = Some(actual),
        }

        let id = entry.article.id();
        if let Some(&slot) = self.index.get(&id) {
            self.entries[slot] = entry;
            Ok(InsertOutcome::Replaced)
        } else {
            self.index.insert(id, self.entries.len());
            self.entries.push(entry);
            Ok(InsertOutcome::Inserted)
        }
    }

    /// The `k` entries most similar to `vector`, most similar first
    ///
    /// Equal scores are ordered by more recent publication, then by insertion.
    /// An empty store yields no results for any query.
    pub fn query(&self, vector: &EmbeddingVector, k: usize) -> Result<Vec<SimilarityResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimension.filter(|d| *d != vector.dimension()) {
            return Err(RagError::DimensionMismatch {
                expected,
                actual: vector.dimension(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (slot, entry.vector.cosine_similarity(vector)))
            .collect();

        scored.sort_by(|(slot_a, score_a), (slot_b, score_b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| self.by_recency(*slot_a, *slot_b))
                .then_with(|| slot_a.cmp(slot_b))
        });

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (slot, score))| SimilarityResult {
                article_id: self.entries[slot].article.id(),
                score,
                rank: i + 1,
            })
            .collect())
    }

    fn by_recency(&self, a: usize, b: usize) -> Ordering {
        self.entries[b]
            .article
            .published_at()
            .cmp(&self.entries[a].article.published_at())
    }
}

impl ArticleLookup for VectorStore {
    fn article(&self, id: &ArticleId) -> Option<&NewsArticle> {
        self.get(id).map(|entry| &entry.article)
    }
}
