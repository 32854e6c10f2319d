//! Report generation for sitrep
//!
//! [`ReportGenerationChain`] turns a [`PromptPackage`](sitrep_prompt::PromptPackage)
//! into ordered report sections, one model call per section. The bilingual
//! instruction templates live in [`prompts`]; [`compose_report`] and
//! [`render_markdown`] produce the final artifact text.

pub mod chain;
pub mod error;
pub mod markdown;
pub mod plan;
pub mod prompts;

pub use chain::{ChainState, GenerationConfig, ReportGenerationChain};
pub use error::{GenerationError, Result};
pub use markdown::{compose_report, render_markdown};
pub use plan::{PlannedSection, SectionPlan};
