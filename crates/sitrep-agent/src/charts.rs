//! Chart component boundary
//!
//! Charts are drawn upstream; [`FileChartRenderer`] only checks that the expected
//! images exist and turns them into references.

use crate::error::ChartError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitrep_core::ChartReference;
use std::path::PathBuf;

/// A chart the run expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    /// File name inside the chart directory
    pub file: String,
    pub period: Option<String>,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
            period: None,
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }
}

/// Produces the chart references for a run
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Charts that will be referenced; must not touch the filesystem
    fn planned(&self) -> Vec<ChartSpec>;

    async fn render(&self) -> Result<Vec<ChartReference>, ChartError>;
}

/// Validates pre-rendered chart images in a directory
#[derive(Debug, Clone)]
pub struct FileChartRenderer {
    dir: PathBuf,
    charts: Vec<ChartSpec>,
}

impl FileChartRenderer {
    /// Daily cases (30 days) and monthly cases (12 months) in `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            charts: vec![
                ChartSpec::new("Casos diários", "daily_cases.png").with_period("últimos 30 dias"),
                ChartSpec::new("Casos mensais", "monthly_cases.png").with_period("últimos 12 meses"),
            ],
        }
    }

    pub fn with_charts(mut self, charts: Vec<ChartSpec>) -> Self {
        self.charts = charts;
        self
    }
}

#[async_trait]
impl ChartRenderer for FileChartRenderer {
    fn planned(&self) -> Vec<ChartSpec> {
        self.charts.clone()
    }

    async fn render(&self) -> Result<Vec<ChartReference>, ChartError> {
        let mut references = Vec::with_capacity(self.charts.len());
        for spec in &self.charts {
            let path = self.dir.join(&spec.file);
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(ChartError::Missing(path));
                }
                Err(source) => return Err(ChartError::Io { path, source }),
            };
            if !metadata.is_file() {
                return Err(ChartError::Missing(path));
            }
            if metadata.len() == 0 {
                return Err(ChartError::Empty(path));
            }

            let mut reference = ChartReference::new(&spec.title, path);
            reference.period.clone_from(&spec.period);
            references.push(reference);
        }
        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_charts_become_references() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("daily_cases.png"), b"png").unwrap();
        std::fs::write(dir.path().join("monthly_cases.png"), b"png").unwrap();

        let references = FileChartRenderer::new(dir.path()).render().await.unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].title, "Casos diários");
        assert_eq!(references[0].path, dir.path().join("daily_cases.png"));
        assert_eq!(references[1].period.as_deref(), Some("últimos 12 meses"));
    }

    #[tokio::test]
    async fn test_missing_chart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("daily_cases.png"), b"png").unwrap();

        let err = FileChartRenderer::new(dir.path()).render().await.unwrap_err();
        assert!(matches!(err, ChartError::Missing(path) if path.ends_with("monthly_cases.png")));
    }

    #[tokio::test]
    async fn test_empty_chart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.png"), b"").unwrap();

        let renderer =
            FileChartRenderer::new(dir.path()).with_charts(vec![ChartSpec::new("Only", "only.png")]);
        assert!(matches!(renderer.render().await.unwrap_err(), ChartError::Empty(_)));
    }
}
