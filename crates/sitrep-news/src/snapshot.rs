//! Offline news source backed by a saved NewsAPI response

use crate::error::{NewsError, Result};
use crate::newsapi::NewsApiArticle;
use crate::source::{NewsQuery, NewsSource};
use futures::stream::{self, BoxStream, StreamExt};
use serde::Deserialize;
use sitrep_core::NewsArticle;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Response { articles: Vec<NewsApiArticle> },
    List(Vec<NewsApiArticle>),
}

/// News source serving a fixed set of articles
///
/// Accepts either a full `/v2/everything` response body or a bare array of
/// articles in the same shape. The query text is ignored (the snapshot is assumed
/// to be the result of a query); the date window is honoured and articles are
/// served newest first, as the live API does.
#[derive(Debug, Clone, Default)]
pub struct StaticNewsSource {
    articles: Vec<NewsArticle>,
}

impl StaticNewsSource {
    pub fn new(articles: Vec<NewsArticle>) -> Self {
        Self { articles }
    }

    /// Load a snapshot from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot_error = |reason: String| NewsError::Snapshot {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| snapshot_error(e.to_string()))?;
        Self::from_json_str(&raw).map_err(|e| match e {
            NewsError::Malformed(reason) => snapshot_error(reason),
            other => other,
        })
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let snapshot: SnapshotFile =
            serde_json::from_str(raw).map_err(|e| NewsError::Malformed(e.to_string()))?;
        let raw_articles = match snapshot {
            SnapshotFile::Response { articles } | SnapshotFile::List(articles) => articles,
        };

        let articles: Vec<NewsArticle> = raw_articles
            .into_iter()
            .filter_map(NewsApiArticle::into_article)
            .collect();
        debug!("Loaded {} article(s) from snapshot", articles.len());

        Ok(Self { articles })
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl NewsSource for StaticNewsSource {
    fn fetch<'a>(&'a self, query: &'a NewsQuery) -> BoxStream<'a, Result<NewsArticle>> {
        let mut matching: Vec<&NewsArticle> = self
            .articles
            .iter()
            .filter(|a| query.window.contains(a.published_at()))
            .collect();
        matching.sort_by(|a, b| b.published_at().cmp(&a.published_at()));

        stream::iter(matching.into_iter().cloned().map(Ok)).boxed()
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::TryStreamExt;
    use sitrep_core::DateWindow;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {"source": {"name": "A"}, "title": "Antiga", "url": "https://a/1",
             "publishedAt": "2025-04-01T00:00:00Z"},
            {"source": {"name": "B"}, "title": "Recente", "url": "https://b/2",
             "publishedAt": "2025-06-29T00:00:00Z"},
            {"source": {"name": "C"}, "title": "Meio", "url": "https://c/3",
             "publishedAt": "2025-06-10T00:00:00Z"}
        ]
    }"#;

    fn june() -> NewsQuery {
        let to = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        NewsQuery::new("SRAG", "pt", DateWindow::last_days(30, to))
    }

    #[tokio::test]
    async fn test_filters_window_and_sorts_newest_first() {
        let source = StaticNewsSource::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(source.len(), 3);

        let query = june();
        let articles: Vec<NewsArticle> = source.fetch(&query).try_collect().await.unwrap();
        let titles: Vec<_> = articles.iter().map(NewsArticle::title).collect();
        assert_eq!(titles, ["Recente", "Meio"]);
    }

    #[test]
    fn test_bare_array_accepted() {
        let source = StaticNewsSource::from_json_str(
            r#"[{"title": "x", "url": "https://x", "publishedAt": "2025-06-01T00:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_from_file_errors_name_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ broken").unwrap();

        match StaticNewsSource::from_json_file(file.path()) {
            Err(NewsError::Snapshot { path, .. }) => {
                assert_eq!(path, file.path().display().to_string());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
