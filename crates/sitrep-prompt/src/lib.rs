//! Prompt assembly for sitrep
//!
//! Turns a metrics summary, chart references and ranked news into one
//! length-bounded [`PromptPackage`], and provides the bilingual [`JinjaTemplate`]s
//! the report chain renders its instructions with.
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use sitrep_core::{ArticleId, ArticleLookup, MetricsSummary, NewsArticle};
//! use sitrep_prompt::{Language, PromptAssembler};
//!
//! struct NoArticles;
//! impl ArticleLookup for NoArticles {
//!     fn article(&self, _id: &ArticleId) -> Option<&NewsArticle> {
//!         None
//!     }
//! }
//!
//! let metrics = MetricsSummary::new(
//!     NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
//!     "Case count rose 12% over 7 days",
//! );
//! let package = PromptAssembler::new(4_000, Language::English)
//!     .assemble(&metrics, &[], &[], &NoArticles)
//!     .unwrap();
//!
//! assert_eq!(package.news_marker(), Some("No current news context available."));
//! assert_eq!(package.render().chars().count(), package.estimated_len());
//! ```

mod assembler;
mod builder;
mod error;
mod jinja;
mod labels;
mod language;
mod package;

pub use assembler::PromptAssembler;
pub use builder::PromptBuilder;
pub use error::{PromptError, Result};
pub use jinja::{JinjaTemplate, JinjaTemplateBuilder};
pub use labels::Labels;
pub use language::Language;
pub use package::{NewsExcerpt, PromptPackage};
