//! News source abstraction

use crate::error::Result;
use futures::stream::BoxStream;
use sitrep_core::{DateWindow, NewsArticle};
use std::sync::Arc;

/// One query against a news source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Free-text search terms
    pub query: String,
    /// ISO 639-1 language code
    pub language: String,
    /// Publication window (inclusive)
    pub window: DateWindow,
}

impl NewsQuery {
    pub fn new(query: impl Into<String>, language: impl Into<String>, window: DateWindow) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
            window,
        }
    }
}

/// A paged source of news articles
///
/// The returned stream is lazy: pages are only requested as it is polled. It is
/// finite and not restartable; a new call re-queries the source. The stream ends
/// after yielding an error.
pub trait NewsSource: Send + Sync {
    fn fetch<'a>(&'a self, query: &'a NewsQuery) -> BoxStream<'a, Result<NewsArticle>>;

    /// Source name for logs
    fn name(&self) -> &str;
}

impl<S: NewsSource + ?Sized> NewsSource for Arc<S> {
    fn fetch<'a>(&'a self, query: &'a NewsQuery) -> BoxStream<'a, Result<NewsArticle>> {
        (**self).fetch(query)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
