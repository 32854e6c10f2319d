//! Length-bounded prompt assembly

use crate::error::{PromptError, Result};
use crate::labels::Labels;
use crate::package::{FixedBlocks, NewsExcerpt, PromptPackage};
use crate::Language;
use sitrep_core::{ArticleLookup, ChartReference, MetricsSummary, SimilarityResult};
use tracing::{debug, info, instrument, warn};

/// Builds [`PromptPackage`]s within a character budget
///
/// Metrics and chart references are always included in full. News excerpts are
/// appended best rank first; the first one that would overflow the budget stops
/// the selection and everything after it is counted as omitted.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    max_chars: usize,
    language: Language,
}

impl PromptAssembler {
    pub fn new(max_chars: usize, language: Language) -> Self {
        Self {
            max_chars,
            language,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Assemble one package
    ///
    /// # Errors
    ///
    /// [`PromptError::MetricsTooLong`] when the metrics summary alone exceeds the
    /// budget, [`PromptError::FixedContentTooLong`] when metrics, chart list and
    /// the empty-news marker together do not fit.
    #[instrument(skip_all, fields(results = results.len(), max_chars = self.max_chars))]
    pub fn assemble(
        &self,
        metrics: &MetricsSummary,
        charts: &[ChartReference],
        results: &[SimilarityResult],
        lookup: &dyn ArticleLookup,
    ) -> Result<PromptPackage> {
        let metrics_len = metrics.len_chars();
        if metrics_len > self.max_chars {
            return Err(PromptError::MetricsTooLong {
                len: metrics_len,
                max: self.max_chars,
            });
        }

        let labels = Labels::for_language(&self.language);
        let blocks = FixedBlocks::render(metrics, charts, labels);
        let fixed_len = blocks.len_chars() + blocks.marker_len_chars();
        if fixed_len > self.max_chars {
            return Err(PromptError::FixedContentTooLong {
                len: fixed_len,
                max: self.max_chars,
            });
        }

        let mut ranked: Vec<&SimilarityResult> = results.iter().collect();
        ranked.sort_by_key(|r| r.rank);

        let mut used = blocks.len_chars();
        let mut excerpts = Vec::new();
        let mut omitted = 0;
        let mut budget_reached = false;
        for result in ranked {
            if budget_reached {
                omitted += 1;
                continue;
            }
            let Some(article) = lookup.article(&result.article_id) else {
                warn!("Ranked article {} not found, skipping", result.article_id);
                omitted += 1;
                continue;
            };

            let excerpt = NewsExcerpt::new(result, article, labels);
            if used + excerpt.len_chars() > self.max_chars {
                debug!(
                    "Excerpt #{} needs {} chars, {} left; stopping",
                    result.rank,
                    excerpt.len_chars(),
                    self.max_chars - used
                );
                budget_reached = true;
                omitted += 1;
                continue;
            }
            used += excerpt.len_chars();
            excerpts.push(excerpt);
        }

        let package = PromptPackage::new(
            self.language.clone(),
            metrics.clone(),
            charts.to_vec(),
            excerpts,
            omitted,
            blocks,
            labels,
        );
        info!(
            "Prompt package: {} excerpt(s), {} omitted, {} of {} chars",
            package.excerpts().len(),
            package.omitted_articles(),
            package.estimated_len(),
            self.max_chars
        );
        Ok(package)
    }
}
