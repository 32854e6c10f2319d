//! News retriever
//!
//! Wraps any [`NewsSource`], dropping repeated URLs and stopping after the
//! configured number of articles. Stopping early also stops paging: the source is
//! only polled until the limit is reached.

use crate::error::Result;
use crate::source::{NewsQuery, NewsSource};
use futures::future;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sitrep_core::NewsArticle;
use std::collections::HashSet;
use tracing::info;

/// De-duplicating, bounded view over a news source
pub struct NewsRetriever<S> {
    source: S,
    max_results: usize,
}

impl<S: NewsSource> NewsRetriever<S> {
    pub fn new(source: S, max_results: usize) -> Self {
        Self {
            source,
            max_results,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Lazy stream of at most `max_results` distinct articles
    ///
    /// An empty stream is a valid result. Errors are yielded as they occur and end
    /// the stream.
    pub fn retrieve<'a>(&'a self, query: &'a NewsQuery) -> BoxStream<'a, Result<NewsArticle>> {
        let mut seen = HashSet::new();
        self.source
            .fetch(query)
            .try_filter(move |article| future::ready(seen.insert(article.url().to_string())))
            .take(self.max_results)
            .boxed()
    }

    /// Drain [`retrieve`](Self::retrieve) into a vector, stopping at the first error
    pub async fn collect(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        let articles: Vec<NewsArticle> = self.retrieve(query).try_collect().await?;
        info!(
            "Retrieved {} article(s) from {}",
            articles.len(),
            self.source.name()
        );
        Ok(articles)
    }
}
