//! Pipeline orchestration for sitrep
//!
//! [`AgentOrchestrator`] runs one confirmation-gated report: metrics, charts, news
//! retrieval, similarity search, prompt assembly, generation and report assembly.
//! The metrics, chart and assembly components are reached through the
//! [`MetricsSource`], [`ChartRenderer`] and [`ReportAssembler`] traits, each with a
//! file-backed implementation.

pub mod assembly;
pub mod charts;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod summary;

pub use assembly::{MarkdownReportWriter, ReportAssembler};
pub use charts::{ChartRenderer, ChartSpec, FileChartRenderer};
pub use error::{AgentError, ChartError, MetricsError, ReportAssemblyError, Result};
pub use metrics::{JsonMetricsSource, MetricPeriod, MetricsSnapshot, MetricsSource};
pub use orchestrator::{
    AgentOrchestrator, AgentOrchestratorBuilder, AgentState, RunOutcome, is_affirmative,
};
pub use summary::ParameterSummary;
