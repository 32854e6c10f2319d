//! Metrics component boundary
//!
//! Statistics are computed upstream. The shipped [`JsonMetricsSource`] reads the
//! snapshot that job writes.

use crate::error::MetricsError;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitrep_core::{Indicator, MetricsSummary};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An indicator the run reports on, with its look-back period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPeriod {
    pub label: String,
    pub period_days: u32,
}

impl MetricPeriod {
    pub fn new(label: impl Into<String>, period_days: u32) -> Self {
        Self {
            label: label.into(),
            period_days,
        }
    }
}

/// Produces the metrics summary for a run
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Indicators that will be reported; must not compute anything
    fn periods(&self) -> Vec<MetricPeriod>;

    async fn compute(&self) -> Result<MetricsSummary, MetricsError>;
}

/// On-disk metrics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Last date covered by the data
    pub as_of: NaiveDate,
    /// Line written above the indicator list
    #[serde(default = "default_intro")]
    pub intro: String,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    /// Ready-made summary text; replaces the rendered indicator list when set
    #[serde(default)]
    pub summary: Option<String>,
}

fn default_intro() -> String {
    "Indicadores calculados:".to_string()
}

impl MetricsSnapshot {
    pub fn into_summary(self) -> Option<MetricsSummary> {
        match self.summary {
            Some(text) if !text.trim().is_empty() => Some(MetricsSummary::new(self.as_of, text)),
            _ if !self.indicators.is_empty() => Some(MetricsSummary::from_indicators(
                self.as_of,
                &self.intro,
                &self.indicators,
            )),
            _ => None,
        }
    }
}

/// Reads a [`MetricsSnapshot`] JSON file
#[derive(Debug, Clone)]
pub struct JsonMetricsSource {
    path: PathBuf,
    periods: Vec<MetricPeriod>,
}

impl JsonMetricsSource {
    /// Source for `path` reporting the standard SRAG indicators
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            periods: vec![
                MetricPeriod::new("Aumento de casos", 7),
                MetricPeriod::new("Aumento de casos", 30),
                MetricPeriod::new("Taxa de mortalidade", 30),
                MetricPeriod::new("Taxa de ocupação de UTI", 30),
                MetricPeriod::new("Taxa de vacinação", 30),
            ],
        }
    }

    pub fn with_periods(mut self, periods: Vec<MetricPeriod>) -> Self {
        self.periods = periods;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetricsSource for JsonMetricsSource {
    fn periods(&self) -> Vec<MetricPeriod> {
        self.periods.clone()
    }

    async fn compute(&self) -> Result<MetricsSummary, MetricsError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| MetricsError::Io {
                path: self.path.clone(),
                source,
            })?;
        let snapshot: MetricsSnapshot =
            serde_json::from_str(&raw).map_err(|source| MetricsError::Parse {
                path: self.path.clone(),
                source,
            })?;

        for period in &self.periods {
            let present = snapshot
                .indicators
                .iter()
                .any(|i| i.label == period.label && i.period_days == period.period_days);
            if !present && snapshot.summary.is_none() {
                warn!(
                    "Snapshot has no '{}' over {} days",
                    period.label, period.period_days
                );
            }
        }

        let summary = snapshot
            .into_summary()
            .ok_or_else(|| MetricsError::Empty(self.path.clone()))?;
        debug!("Metrics as of {}: {} chars", summary.as_of, summary.len_chars());
        Ok(summary)
    }
}
