//! Core data model for sitrep
//!
//! Shared by every pipeline crate: news articles, embedding vectors, search
//! results, report sections, the error taxonomy and the pipeline configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{ClassifyError, ConfigError, ErrorKind, Result, Stage};
pub use types::{
    ArticleId, ArticleLookup, ChartReference, DateWindow, EmbeddingVector, FinalReport,
    Indicator, MISSING_TITLE, MetricsSummary, NewsArticle, ReportSection, SectionKind,
    SimilarityResult, VectorStoreEntry, cosine_similarity,
};
