//! Confirmation-gated pipeline orchestrator
//!
//! ```text
//! CollectingParameters -> AwaitingConfirmation -> Running -> Completed
//!                                              \-> Aborted          \-> Failed
//! ```
//!
//! Nothing external is touched before the user confirms. Once running, the stages
//! execute in order without further interaction and the first failure ends the run.

use crate::assembly::ReportAssembler;
use crate::charts::ChartRenderer;
use crate::error::{AgentError, Result};
use crate::metrics::MetricsSource;
use crate::summary::ParameterSummary;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sitrep_core::{ClassifyError, ConfigError, ErrorKind, PipelineConfig, Stage};
use sitrep_llm::{EmbeddingProvider, LLMProvider};
use sitrep_news::{NewsQuery, NewsRetriever, NewsSource};
use sitrep_prompt::{Language, PromptAssembler};
use sitrep_rag::{EmbeddingEncoder, SimilaritySearcher};
use sitrep_report::{GenerationConfig, ReportGenerationChain, compose_report};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Lifecycle of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    CollectingParameters,
    AwaitingConfirmation,
    Running,
    Completed,
    Aborted,
    Failed { stage: Stage, kind: ErrorKind },
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentState::CollectingParameters => f.write_str("collecting parameters"),
            AgentState::AwaitingConfirmation => f.write_str("awaiting confirmation"),
            AgentState::Running => f.write_str("running"),
            AgentState::Completed => f.write_str("completed"),
            AgentState::Aborted => f.write_str("aborted"),
            AgentState::Failed { stage, kind } => write!(f, "failed at {stage} ({kind})"),
        }
    }
}

/// `y`, `yes`, `s` or `sim`, ignoring case and surrounding whitespace
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub artifact: PathBuf,
    pub sections: usize,
    pub retrieved_articles: usize,
    pub selected_articles: usize,
    pub omitted_articles: usize,
}

/// Drives one report run
pub struct AgentOrchestrator {
    config: PipelineConfig,
    metrics: Arc<dyn MetricsSource>,
    charts: Arc<dyn ChartRenderer>,
    news: Arc<dyn NewsSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn LLMProvider>,
    assembler: Arc<dyn ReportAssembler>,
    today: NaiveDate,
    state: AgentState,
}

impl AgentOrchestrator {
    pub fn builder() -> AgentOrchestratorBuilder {
        AgentOrchestratorBuilder::new()
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn expect_state(&self, expected: AgentState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AgentError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Describe the run and wait for confirmation
    pub fn collect_parameters(&mut self) -> Result<ParameterSummary> {
        self.expect_state(AgentState::CollectingParameters, "collect parameters")?;

        let summary = ParameterSummary {
            topic: self.config.topic.clone(),
            language: self.config.language.clone(),
            search_query: self.config.search_query.clone(),
            window: self.config.date_window(self.today),
            metrics: self.metrics.periods(),
            charts: self.charts.planned(),
            max_news_results: self.config.max_news_results,
            top_k: self.config.top_k,
            embedding_model: self.config.embedding_model.clone(),
            generation_model: self.config.generation_model.clone(),
            output_dir: self.config.output_dir.clone(),
        };
        self.state = AgentState::AwaitingConfirmation;
        Ok(summary)
    }

    /// Apply the user's answer; anything but an affirmative aborts
    pub fn confirm(&mut self, answer: &str) -> Result<AgentState> {
        self.expect_state(AgentState::AwaitingConfirmation, "confirm")?;

        self.state = if is_affirmative(answer) {
            info!("Run confirmed");
            AgentState::Running
        } else {
            info!("Run declined");
            AgentState::Aborted
        };
        Ok(self.state)
    }

    /// Execute every stage
    ///
    /// # Errors
    ///
    /// [`AgentError::StageFailed`] with the failing stage and error kind; the
    /// orchestrator is then `Failed` and no artifact exists.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        self.expect_state(AgentState::Running, "run")?;

        let result = self.execute().await;
        match &result {
            Ok(outcome) => {
                info!("Report ready at {}", outcome.artifact.display());
                self.state = AgentState::Completed;
            }
            Err(e) => {
                error!("Run failed: {}", e);
                // execute only returns stage failures
                self.state = AgentState::Failed {
                    stage: e.failed_stage().unwrap_or(Stage::Metrics),
                    kind: e.kind(),
                };
            }
        }
        result
    }

    #[instrument(skip(self), fields(topic = %self.config.topic))]
    async fn execute(&self) -> Result<RunOutcome> {
        let config = &self.config;
        let language = Language::from_code(&config.language);

        info!("Computing metrics");
        let metrics = self
            .metrics
            .compute()
            .await
            .map_err(|e| AgentError::stage(Stage::Metrics, e))?;

        info!("Collecting charts");
        let charts = self
            .charts
            .render()
            .await
            .map_err(|e| AgentError::stage(Stage::Charts, e))?;

        info!("Retrieving news about '{}'", config.topic);
        let query = NewsQuery::new(
            &config.topic,
            &config.language,
            config.date_window(self.today),
        );
        let retriever = NewsRetriever::new(Arc::clone(&self.news), config.max_news_results);
        let articles = retriever
            .collect(&query)
            .await
            .map_err(|e| AgentError::stage(Stage::Retrieval, e))?;

        let encoder = EmbeddingEncoder::new(Arc::clone(&self.embedder), &config.embedding_model)
            .with_retry_policy(config.retry_policy())
            .with_timeout(config.call_timeout());
        let mut searcher = SimilaritySearcher::new(encoder);
        let results = if articles.is_empty() {
            info!("No news retrieved, continuing without news context");
            Vec::new()
        } else {
            info!("Ranking {} article(s)", articles.len());
            searcher
                .search(&config.search_query, &articles, config.top_k)
                .await
                .map_err(|e| AgentError::stage(Stage::Search, e))?
        };

        info!("Assembling prompt");
        let package = PromptAssembler::new(config.max_prompt_chars, language.clone())
            .assemble(&metrics, &charts, &results, searcher.store())
            .map_err(|e| AgentError::stage(Stage::Prompt, e))?;

        info!("Generating report text");
        let mut chain = ReportGenerationChain::new(
            Arc::clone(&self.generator),
            GenerationConfig::from_pipeline(config),
            &language,
        )
        .map_err(|e| AgentError::stage(Stage::Generation, e))?;
        let sections = chain
            .generate(&package)
            .await
            .map_err(|e| AgentError::stage(Stage::Generation, e))?;

        info!("Assembling report");
        let section_count = sections.len();
        let report = compose_report(&config.report_title, &package, sections, Utc::now());
        let artifact = self
            .assembler
            .assemble(&report)
            .await
            .map_err(|e| AgentError::stage(Stage::Assembly, e))?;

        Ok(RunOutcome {
            artifact,
            sections: section_count,
            retrieved_articles: articles.len(),
            selected_articles: package.excerpts().len(),
            omitted_articles: package.omitted_articles(),
        })
    }
}

/// Builder for [`AgentOrchestrator`]
#[derive(Default)]
pub struct AgentOrchestratorBuilder {
    config: Option<PipelineConfig>,
    metrics: Option<Arc<dyn MetricsSource>>,
    charts: Option<Arc<dyn ChartRenderer>>,
    news: Option<Arc<dyn NewsSource>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn LLMProvider>>,
    assembler: Option<Arc<dyn ReportAssembler>>,
    today: Option<NaiveDate>,
}

impl AgentOrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsSource>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn charts(mut self, charts: Arc<dyn ChartRenderer>) -> Self {
        self.charts = Some(charts);
        self
    }

    pub fn news(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn LLMProvider>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn assembler(mut self, assembler: Arc<dyn ReportAssembler>) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Reference date for the default news window (defaults to today, UTC)
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator is missing or the configuration is invalid
    pub fn build(self) -> Result<AgentOrchestrator> {
        fn require<T>(value: Option<T>, field: &'static str) -> Result<T> {
            value.ok_or_else(|| ConfigError::invalid(field, "not set").into())
        }

        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AgentOrchestrator {
            config,
            metrics: require(self.metrics, "metrics")?,
            charts: require(self.charts, "charts")?,
            news: require(self.news, "news")?,
            embedder: require(self.embedder, "embedder")?,
            generator: require(self.generator, "generator")?,
            assembler: require(self.assembler, "assembler")?,
            today: self.today.unwrap_or_else(|| Utc::now().date_naive()),
            state: AgentState::CollectingParameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{MarkdownReportWriter, MockReportAssembler};
    use crate::charts::{ChartSpec, MockChartRenderer};
    use crate::metrics::{MetricPeriod, MockMetricsSource};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use futures::stream::{self, BoxStream, StreamExt};
    use sitrep_core::{ChartReference, MetricsSummary, NewsArticle};
    use sitrep_llm::{
        CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse, LLMError,
        Message, StopReason, TokenUsage,
    };
    use sitrep_news::{NewsError, StaticNewsSource};
    use sitrep_rag::HashingEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    mockall::mock! {
        Generator {}

        #[async_trait]
        impl LLMProvider for Generator {
            async fn complete(&self, request: CompletionRequest) -> sitrep_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    mockall::mock! {
        Embedder {}

        #[async_trait]
        impl EmbeddingProvider for Embedder {
            async fn embed(&self, request: EmbeddingRequest) -> sitrep_llm::Result<EmbeddingResponse>;
            fn name(&self) -> &str;
        }
    }

    /// Counts fetches; fails with a rate limit when `fail` is set
    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl NewsSource for CountingSource {
        fn fetch<'a>(
            &'a self,
            _query: &'a NewsQuery,
        ) -> BoxStream<'a, sitrep_news::Result<NewsArticle>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                stream::once(async {
                    Err(NewsError::RateLimitExceeded {
                        provider: "newsapi".to_string(),
                        message: "quota exhausted".to_string(),
                    })
                })
                .boxed()
            } else {
                stream::empty().boxed()
            }
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn config(output_dir: &std::path::Path) -> PipelineConfig {
        PipelineConfig::builder()
            .top_k(2)
            .retry_initial_backoff(Duration::from_millis(1))
            .output_dir(output_dir)
            .build()
            .unwrap()
    }

    fn article(url: &str, title: &str, day: u32) -> NewsArticle {
        NewsArticle::new(
            Some(title.to_string()),
            Some(format!("{title} segundo boletim")),
            "Agência Saúde",
            Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0).unwrap(),
            url,
        )
    }

    fn metrics() -> MockMetricsSource {
        let mut metrics = MockMetricsSource::new();
        metrics
            .expect_periods()
            .returning(|| vec![MetricPeriod::new("Aumento de casos", 7)]);
        metrics.expect_compute().returning(|| {
            Ok(MetricsSummary::new(
                NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                "Case count rose 12% over 7 days",
            ))
        });
        metrics
    }

    fn charts() -> MockChartRenderer {
        let mut charts = MockChartRenderer::new();
        charts
            .expect_planned()
            .returning(|| vec![ChartSpec::new("Casos diários", "daily_cases.png")]);
        charts
            .expect_render()
            .returning(|| Ok(vec![ChartReference::new("Casos diários", "out/daily_cases.png")]));
        charts
    }

    fn writing_generator(calls: usize) -> MockGenerator {
        let mut generator = MockGenerator::new();
        generator.expect_complete().times(calls).returning(|_| {
            Ok(CompletionResponse {
                message: Message::assistant("Texto da seção."),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        });
        generator
    }

    fn confirmed(mut orchestrator: AgentOrchestrator) -> AgentOrchestrator {
        orchestrator.collect_parameters().unwrap();
        assert_eq!(orchestrator.confirm("sim").unwrap(), AgentState::Running);
        orchestrator
    }

    #[test]
    fn test_affirmative_answers() {
        for answer in ["y", "YES", " s ", "Sim\n"] {
            assert!(is_affirmative(answer), "{answer:?}");
        }
        for answer in ["", "n", "não", "yes please", "ok"] {
            assert!(!is_affirmative(answer), "{answer:?}");
        }
    }

    #[tokio::test]
    async fn test_declined_confirmation_makes_no_external_calls() {
        let dir = tempfile::tempdir().unwrap();
        let mut metrics = MockMetricsSource::new();
        metrics.expect_periods().returning(Vec::new);
        metrics.expect_compute().never();
        let mut charts = MockChartRenderer::new();
        charts.expect_planned().returning(Vec::new);
        charts.expect_render().never();
        let mut assembler = MockReportAssembler::new();
        assembler.expect_assemble().never();
        let news = Arc::new(CountingSource::default());

        let mut orchestrator = AgentOrchestrator::builder()
            .config(config(dir.path()))
            .metrics(Arc::new(metrics))
            .charts(Arc::new(charts))
            .news(news.clone())
            .embedder(Arc::new(MockEmbedder::new()))
            .generator(Arc::new(MockGenerator::new()))
            .assembler(Arc::new(assembler))
            .today(today())
            .build()
            .unwrap();

        let summary = orchestrator.collect_parameters().unwrap();
        assert_eq!(summary.topic, "SRAG");
        assert_eq!(orchestrator.state(), AgentState::AwaitingConfirmation);

        assert_eq!(orchestrator.confirm("no").unwrap(), AgentState::Aborted);
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidState { operation: "run", .. }));
        assert_eq!(news.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let news = StaticNewsSource::new(vec![
            article("https://news/uti", "Internações em UTI por SRAG sobem", 9),
            article("https://news/vacina", "Taxa de vacinação contra gripe avança", 8),
            article("https://news/futebol", "Final do campeonato estadual", 7),
        ]);

        let orchestrator = AgentOrchestrator::builder()
            .config(config(dir.path()))
            .metrics(Arc::new(metrics()))
            .charts(Arc::new(charts()))
            .news(Arc::new(news))
            .embedder(Arc::new(HashingEmbedder::default()))
            .generator(Arc::new(writing_generator(5)))
            .assembler(Arc::new(MarkdownReportWriter::new(
                dir.path(),
                Language::Portuguese,
            )))
            .today(today())
            .build()
            .unwrap();
        let mut orchestrator = confirmed(orchestrator);

        let outcome = orchestrator.run().await.unwrap();

        assert_eq!(orchestrator.state(), AgentState::Completed);
        assert_eq!(outcome.sections, 5);
        assert_eq!(outcome.retrieved_articles, 3);
        assert_eq!(outcome.selected_articles, 2);
        let report = std::fs::read_to_string(&outcome.artifact).unwrap();
        assert!(report.starts_with("# Relatório Técnico do Panorama de SRAG"));
        assert!(report.contains("## Análise das métricas"));
    }

    #[tokio::test]
    async fn test_empty_news_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = AgentOrchestrator::builder()
            .config(config(dir.path()))
            .metrics(Arc::new(metrics()))
            .charts(Arc::new(charts()))
            .news(Arc::new(CountingSource::default()))
            .embedder(Arc::new(MockEmbedder::new()))
            .generator(Arc::new(writing_generator(5)))
            .assembler(Arc::new(MarkdownReportWriter::new(dir.path(), Language::Portuguese)))
            .today(today())
            .build()
            .unwrap();
        let mut orchestrator = confirmed(orchestrator);

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(outcome.retrieved_articles, 0);
        assert_eq!(outcome.selected_articles, 0);
        assert!(outcome.artifact.exists());
    }

    #[tokio::test]
    async fn test_retrieval_failure_reports_stage_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = MockReportAssembler::new();
        assembler.expect_assemble().never();
        let orchestrator = AgentOrchestrator::builder()
            .config(config(dir.path()))
            .metrics(Arc::new(metrics()))
            .charts(Arc::new(charts()))
            .news(Arc::new(CountingSource {
                fail: true,
                ..CountingSource::default()
            }))
            .embedder(Arc::new(MockEmbedder::new()))
            .generator(Arc::new(MockGenerator::new()))
            .assembler(Arc::new(assembler))
            .today(today())
            .build()
            .unwrap();
        let mut orchestrator = confirmed(orchestrator);

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::StageFailed {
                stage: Stage::Retrieval,
                kind: ErrorKind::RateLimit,
                ..
            }
        ));
        assert_eq!(
            orchestrator.state(),
            AgentState::Failed {
                stage: Stage::Retrieval,
                kind: ErrorKind::RateLimit
            }
        );
    }

    #[tokio::test]
    async fn test_generation_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed");
        let mut generator = MockGenerator::new();
        generator
            .expect_complete()
            .times(1)
            .returning(|_| Err(LLMError::AuthenticationFailed));

        let orchestrator = AgentOrchestrator::builder()
            .config(config(&out))
            .metrics(Arc::new(metrics()))
            .charts(Arc::new(charts()))
            .news(Arc::new(CountingSource::default()))
            .embedder(Arc::new(MockEmbedder::new()))
            .generator(Arc::new(generator))
            .assembler(Arc::new(MarkdownReportWriter::new(&out, Language::Portuguese)))
            .today(today())
            .build()
            .unwrap();
        let mut orchestrator = confirmed(orchestrator);

        let err = orchestrator.run().await.unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Generation));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!out.exists());
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = AgentOrchestrator::builder().build();
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn test_parameters_collected_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut orchestrator = AgentOrchestrator::builder()
            .config(config(dir.path()))
            .metrics(Arc::new(metrics()))
            .charts(Arc::new(charts()))
            .news(Arc::new(CountingSource::default()))
            .embedder(Arc::new(MockEmbedder::new()))
            .generator(Arc::new(MockGenerator::new()))
            .assembler(Arc::new(MockReportAssembler::new()))
            .today(today())
            .build()
            .unwrap();

        let summary = orchestrator.collect_parameters().unwrap();
        assert_eq!(summary.window.to, today());
        assert_eq!(summary.charts.len(), 1);
        assert!(orchestrator.collect_parameters().is_err());
    }
}
