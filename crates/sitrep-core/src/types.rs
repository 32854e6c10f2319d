//! Data model shared by every pipeline stage
//!
//! Everything here lives for a single pipeline invocation. Articles are immutable
//! once fetched; vectors and search results are produced fresh per run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Title used when the news source returns an article without one
pub const MISSING_TITLE: &str = "no-title";

/// Stable article identifier derived from the article URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArticleId(Uuid);

impl ArticleId {
    /// Derive the id of the article published at `url`
    ///
    /// The same URL always yields the same id (UUIDv5 in the URL namespace).
    pub fn from_url(url: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, url.trim().as_bytes()))
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A news article fetched from the news source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    id: ArticleId,
    title: String,
    description: String,
    source: String,
    published_at: DateTime<Utc>,
    url: String,
}

impl NewsArticle {
    /// Create an article, normalising missing title and description
    pub fn new(
        title: Option<String>,
        description: Option<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
        url: impl Into<String>,
    ) -> Self {
        let url = url.into().trim().to_string();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| MISSING_TITLE.to_string());

        Self {
            id: ArticleId::from_url(&url),
            title,
            description: description.map(|d| d.trim().to_string()).unwrap_or_default(),
            source: source.into(),
            published_at,
            url,
        }
    }

    pub fn id(&self) -> ArticleId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text submitted to the embedding model: title and description
    pub fn embedding_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}

/// Fixed-dimension embedding of a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Cosine similarity in [-1, 1]
    ///
    /// Returns 0.0 when the dimensions differ or either vector has zero magnitude.
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        cosine_similarity(&self.0, &other.0)
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Compute cosine similarity between two vectors.
/// Returns 0.0 if the lengths differ or either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

/// An embedded article held by the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStoreEntry {
    pub article: NewsArticle,
    pub vector: EmbeddingVector,
}

impl VectorStoreEntry {
    pub fn new(article: NewsArticle, vector: EmbeddingVector) -> Self {
        Self { article, vector }
    }
}

/// One ranked hit of a similarity query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Article id, resolved through an [`ArticleLookup`]
    pub article_id: ArticleId,
    /// Cosine similarity to the query
    pub score: f32,
    /// 1-based rank, 1 being the most similar
    pub rank: usize,
}

/// Resolves article ids to the articles that own them
pub trait ArticleLookup {
    fn article(&self, id: &ArticleId) -> Option<&NewsArticle>;
}

/// Inclusive calendar window used to filter news
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The `days`-day window ending on `today` (inclusive)
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let span = chrono::Days::new(u64::from(days.saturating_sub(1)));
        Self {
            from: today.checked_sub_days(span).unwrap_or(NaiveDate::MIN),
            to: today,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        day >= self.from && day <= self.to
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

/// One computed indicator from the metrics component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Human label, e.g. "Case variation rate"
    pub label: String,
    /// Look-back period in days
    pub period_days: u32,
    /// Value in percent; `None` when the component could not compute it
    pub value_pct: Option<f64>,
}

/// Metrics summary handed over by the metrics component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Last date covered by the underlying data
    pub as_of: NaiveDate,
    /// Summary text, always included verbatim in the prompt
    pub text: String,
}

impl MetricsSummary {
    pub fn new(as_of: NaiveDate, text: impl Into<String>) -> Self {
        Self {
            as_of,
            text: text.into(),
        }
    }

    /// Render indicators as one bullet line each under `intro`
    pub fn from_indicators(as_of: NaiveDate, intro: &str, indicators: &[Indicator]) -> Self {
        let mut text = format!("{intro}\n");
        for indicator in indicators {
            let value = indicator
                .value_pct
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}%"));
            text.push_str(&format!(
                "- {} ({} days): {}\n",
                indicator.label, indicator.period_days, value
            ));
        }
        Self { as_of, text }
    }

    /// Estimated prompt length of the summary
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }
}

/// Reference to a chart image produced by the chart component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartReference {
    pub title: String,
    pub path: PathBuf,
    /// Period covered, e.g. "last 30 days"
    #[serde(default)]
    pub period: Option<String>,
}

impl ChartReference {
    pub fn new(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            period: None,
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }
}

/// Sections of the generated report, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ContextOverview,
    MetricsAnalysis,
    NewsContext,
    Recommendations,
    ChartIntroduction,
}

impl SectionKind {
    /// Every section in report order
    pub const ALL: [SectionKind; 5] = [
        SectionKind::ContextOverview,
        SectionKind::MetricsAnalysis,
        SectionKind::NewsContext,
        SectionKind::Recommendations,
        SectionKind::ChartIntroduction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::ContextOverview => "context_overview",
            SectionKind::MetricsAnalysis => "metrics_analysis",
            SectionKind::NewsContext => "news_context",
            SectionKind::Recommendations => "recommendations",
            SectionKind::ChartIntroduction => "chart_introduction",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated section of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub heading: String,
    pub text: String,
}

/// The complete report handed to the report assembler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub title: String,
    pub as_of: NaiveDate,
    pub sections: Vec<ReportSection>,
    pub charts: Vec<ChartReference>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_article_id_is_stable_per_url() {
        let a = ArticleId::from_url("https://example.com/a");
        let b = ArticleId::from_url(" https://example.com/a ");
        let c = ArticleId::from_url("https://example.com/b");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_article_normalises_missing_fields() {
        let article = NewsArticle::new(
            None,
            None,
            "Agência",
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
            "https://example.com/x",
        );
        assert_eq!(article.title(), MISSING_TITLE);
        assert_eq!(article.description(), "");
        assert_eq!(article.embedding_text(), MISSING_TITLE);
        assert_eq!(article.id(), ArticleId::from_url("https://example.com/x"));
    }

    #[test]
    fn test_embedding_text_joins_title_and_description() {
        let article = NewsArticle::new(
            Some("Casos de SRAG sobem".to_string()),
            Some("Alta de 12% em uma semana".to_string()),
            "Folha",
            Utc::now(),
            "https://example.com/y",
        );
        assert_eq!(
            article.embedding_text(),
            "Casos de SRAG sobem Alta de 12% em uma semana"
        );
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_date_window() {
        let window = DateWindow::last_days(30, day(2025, 6, 30));
        assert_eq!(window.from, day(2025, 6, 1));
        assert!(window.is_valid());
        assert!(window.contains(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()));
        assert!(!DateWindow::new(day(2025, 2, 1), day(2025, 1, 1)).is_valid());
    }

    #[test]
    fn test_metrics_from_indicators() {
        let summary = MetricsSummary::from_indicators(
            day(2025, 6, 30),
            "Latest SRAG metrics:",
            &[
                Indicator {
                    label: "Case variation rate".to_string(),
                    period_days: 7,
                    value_pct: Some(12.0),
                },
                Indicator {
                    label: "ICU occupancy rate".to_string(),
                    period_days: 30,
                    value_pct: None,
                },
            ],
        );
        assert!(summary.text.starts_with("Latest SRAG metrics:\n"));
        assert!(summary.text.contains("- Case variation rate (7 days): 12.00%"));
        assert!(summary.text.contains("- ICU occupancy rate (30 days): n/a"));
    }

    #[test]
    fn test_section_order() {
        let mut sorted = SectionKind::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, SectionKind::ALL.to_vec());
    }
}
