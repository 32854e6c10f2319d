//! The assembled prompt package
//!
//! A [`PromptPackage`] is plain data: every block it renders is built once by the
//! assembler, so its reported length is exactly the length of [`PromptPackage::render`].

use crate::builder::PromptBuilder;
use crate::labels::Labels;
use crate::Language;
use chrono::{DateTime, Utc};
use sitrep_core::{ArticleId, ChartReference, MetricsSummary, NewsArticle, SimilarityResult};

/// One selected news article as it appears in the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct NewsExcerpt {
    pub article_id: ArticleId,
    pub rank: usize,
    pub score: f32,
    pub title: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub description: String,
    text: String,
}

impl NewsExcerpt {
    pub(crate) fn new(result: &SimilarityResult, article: &NewsArticle, labels: &Labels) -> Self {
        let mut builder = PromptBuilder::new()
            .subsection(format!("{}. {}", result.rank, article.title()))
            .field(labels.url, article.url())
            .field(
                labels.published,
                article.published_at().format(labels.date_format).to_string(),
            )
            .field(labels.source, article.source());
        if !article.description().trim().is_empty() {
            builder = builder.field(labels.description, article.description().trim());
        }

        Self {
            article_id: result.article_id,
            rank: result.rank,
            score: result.score,
            title: article.title().to_string(),
            source: article.source().to_string(),
            url: article.url().to_string(),
            published_at: article.published_at(),
            description: article.description().to_string(),
            text: builder.newline().build(),
        }
    }

    /// The excerpt exactly as rendered in the prompt
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Fixed blocks of a package, rendered before any news is selected
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FixedBlocks {
    pub metrics: String,
    pub news_header: String,
    pub marker: String,
    pub charts: String,
}

impl FixedBlocks {
    pub fn render(metrics: &MetricsSummary, charts: &[ChartReference], labels: &Labels) -> Self {
        let metrics_block = PromptBuilder::new()
            .section(labels.dated_metrics_header(metrics.as_of))
            .text(metrics.text.trim_end())
            .blank_line()
            .build();

        let mut charts_builder = PromptBuilder::new().section(labels.charts_header);
        if charts.is_empty() {
            charts_builder = charts_builder.bullet(labels.no_charts);
        }
        for chart in charts {
            let title = match &chart.period {
                Some(period) => format!("{} ({period})", chart.title),
                None => chart.title.clone(),
            };
            charts_builder = charts_builder.bullet(format!("{title}: {}", chart.path.display()));
        }

        Self {
            metrics: metrics_block,
            news_header: PromptBuilder::new().section(labels.news_header).build(),
            marker: PromptBuilder::new().text(labels.no_news).blank_line().build(),
            charts: charts_builder.build(),
        }
    }

    /// Length of everything but the news body
    pub fn len_chars(&self) -> usize {
        [&self.metrics, &self.news_header, &self.charts]
            .iter()
            .map(|block| block.chars().count())
            .sum()
    }

    pub fn marker_len_chars(&self) -> usize {
        self.marker.chars().count()
    }
}

/// Everything the generation chain needs, bounded in length
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPackage {
    language: Language,
    metrics: MetricsSummary,
    charts: Vec<ChartReference>,
    excerpts: Vec<NewsExcerpt>,
    news_marker: Option<String>,
    omitted_articles: usize,
    estimated_len: usize,
    blocks: FixedBlocks,
}

impl PromptPackage {
    pub(crate) fn new(
        language: Language,
        metrics: MetricsSummary,
        charts: Vec<ChartReference>,
        excerpts: Vec<NewsExcerpt>,
        omitted_articles: usize,
        blocks: FixedBlocks,
        labels: &Labels,
    ) -> Self {
        let news_marker = excerpts.is_empty().then(|| labels.no_news.to_string());
        let news_len = if excerpts.is_empty() {
            blocks.marker_len_chars()
        } else {
            excerpts.iter().map(NewsExcerpt::len_chars).sum()
        };

        Self {
            estimated_len: blocks.len_chars() + news_len,
            language,
            metrics,
            charts,
            excerpts,
            news_marker,
            omitted_articles,
            blocks,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn metrics(&self) -> &MetricsSummary {
        &self.metrics
    }

    /// Chart references in the order they were given
    pub fn charts(&self) -> &[ChartReference] {
        &self.charts
    }

    /// Selected news, best rank first
    pub fn excerpts(&self) -> &[NewsExcerpt] {
        &self.excerpts
    }

    /// Set when no news made it into the package
    pub fn news_marker(&self) -> Option<&str> {
        self.news_marker.as_deref()
    }

    pub fn has_news(&self) -> bool {
        !self.excerpts.is_empty()
    }

    /// Ranked articles left out because of the length budget or a failed lookup
    pub fn omitted_articles(&self) -> usize {
        self.omitted_articles
    }

    /// Character count of [`render`](Self::render)
    pub fn estimated_len(&self) -> usize {
        self.estimated_len
    }

    /// The grounded prompt body: dated metrics, news, then charts
    pub fn render(&self) -> String {
        let mut builder = PromptBuilder::new()
            .text(self.blocks.metrics.as_str())
            .text(self.blocks.news_header.as_str());
        if self.excerpts.is_empty() {
            builder = builder.text(self.blocks.marker.as_str());
        }
        for excerpt in &self.excerpts {
            builder = builder.text(excerpt.text());
        }
        builder.text(self.blocks.charts.as_str()).build()
    }
}
