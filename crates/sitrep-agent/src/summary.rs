//! Run description shown before confirmation

use crate::charts::ChartSpec;
use crate::metrics::MetricPeriod;
use serde::Serialize;
use sitrep_core::DateWindow;
use std::path::PathBuf;

/// Everything the user confirms before the pipeline runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub topic: String,
    pub language: String,
    pub search_query: String,
    pub window: DateWindow,
    pub metrics: Vec<MetricPeriod>,
    pub charts: Vec<ChartSpec>,
    pub max_news_results: usize,
    pub top_k: usize,
    pub embedding_model: String,
    pub generation_model: String,
    pub output_dir: PathBuf,
}

impl ParameterSummary {
    /// Label/value pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let metrics = self
            .metrics
            .iter()
            .map(|m| format!("{} ({} days)", m.label, m.period_days))
            .collect::<Vec<_>>()
            .join("\n");
        let charts = self
            .charts
            .iter()
            .map(|c| match &c.period {
                Some(period) => format!("{} ({period})", c.title),
                None => c.title.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");

        vec![
            ("Topic", self.topic.clone()),
            ("Language", self.language.clone()),
            ("News query", self.search_query.clone()),
            ("News window", self.window.to_string()),
            ("Metrics", metrics),
            ("Charts", charts),
            ("Max news results", self.max_news_results.to_string()),
            ("Top-k news", self.top_k.to_string()),
            ("Embedding model", self.embedding_model.clone()),
            ("Generation model", self.generation_model.clone()),
            ("Output directory", self.output_dir.display().to_string()),
        ]
    }
}
