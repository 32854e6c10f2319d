//! Section-by-section report generation
//!
//! The chain walks its [`SectionPlan`] in order and makes one model call per
//! section. Transient provider failures are retried with exponential backoff; a
//! declined or empty answer gets one more try. Any other outcome ends the run and
//! discards the sections written so far.

use crate::error::{GenerationError, Result};
use crate::plan::SectionPlan;
use crate::prompts;
use serde_json::json;
use sitrep_core::{PipelineConfig, ReportSection, SectionKind};
use sitrep_llm::{CompletionRequest, LLMError, LLMProvider, Message};
use sitrep_prompt::{JinjaTemplate, Language, PromptPackage};
use sitrep_utils::{RetryPolicy, Retryable};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Extra attempts granted to a declined or empty answer
const UNUSABLE_ANSWER_RETRIES: u32 = 1;

/// Configuration for report generation
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model to use
    pub model: String,

    /// Max tokens per section
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// Surveillance subject named in the prompts
    pub topic: String,

    /// Upper bound for a single model call
    pub call_timeout: Duration,

    /// Backoff for transient failures; `max_attempts` bounds the calls that may end
    /// in a transient error, separately from the unusable-answer retry
    pub retry: RetryPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 1024,
            temperature: Some(0.0),
            topic: "SRAG".to_string(),
            call_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

impl GenerationConfig {
    pub fn from_pipeline(config: &PipelineConfig) -> Self {
        Self {
            model: config.generation_model.clone(),
            max_tokens: config.generation_max_tokens as usize,
            temperature: Some(config.temperature),
            topic: config.topic.clone(),
            call_timeout: config.call_timeout(),
            retry: config.retry_policy(),
        }
    }
}

/// Where the chain is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Pending,
    /// Waiting on call number `attempt` for `section`
    Generating { section: SectionKind, attempt: u32 },
    Complete,
    /// `section` is `None` when the failure happened before any call
    Failed { section: Option<SectionKind> },
}

/// Why an answer could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unusable {
    Declined,
    Empty,
}

/// Turns a [`PromptPackage`] into report sections
pub struct ReportGenerationChain {
    provider: Arc<dyn LLMProvider>,
    config: GenerationConfig,
    plan: SectionPlan,
    persona: JinjaTemplate,
    request: JinjaTemplate,
    state: ChainState,
}

impl ReportGenerationChain {
    /// Chain over the standard section plan in `language`
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        config: GenerationConfig,
        language: &Language,
    ) -> Result<Self> {
        Ok(Self {
            provider,
            config,
            plan: SectionPlan::standard(language)?,
            persona: prompts::analyst_persona()?,
            request: prompts::section_request()?,
            state: ChainState::Pending,
        })
    }

    pub fn with_plan(mut self, plan: SectionPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn plan(&self) -> &SectionPlan {
        &self.plan
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Generate every planned section, in plan order
    ///
    /// # Errors
    ///
    /// Returns the first section failure; no sections are returned with it.
    pub async fn generate(&mut self, package: &PromptPackage) -> Result<Vec<ReportSection>> {
        self.state = ChainState::Pending;
        let result = self.run(package).await;
        self.state = match &result {
            Ok(_) => ChainState::Complete,
            Err(e) => ChainState::Failed {
                section: e.section(),
            },
        };
        result
    }

    async fn run(&mut self, package: &PromptPackage) -> Result<Vec<ReportSection>> {
        let lang = package.language();
        let system = self
            .persona
            .render_with_fallback(lang, &json!({ "topic": self.config.topic }))?;

        // Render every request before the first call so a template error costs nothing
        let body = package.render();
        let charts: Vec<_> = package
            .charts()
            .iter()
            .map(|c| json!({ "title": c.title, "period": c.period }))
            .collect();
        let context = json!({
            "topic": self.config.topic,
            "has_news": package.has_news(),
            "charts": charts,
        });
        let mut requests = Vec::with_capacity(self.plan.len());
        for planned in self.plan.sections() {
            let instruction = planned.instruction.render_with_fallback(lang, &context)?;
            let user = self.request.render_with_fallback(
                lang,
                &json!({
                    "body": body,
                    "heading": planned.heading,
                    "instruction": instruction,
                }),
            )?;
            requests.push((planned.kind, planned.heading.clone(), user));
        }

        let mut sections = Vec::with_capacity(requests.len());
        for (kind, heading, user) in requests {
            let text = self.generate_section(kind, &system, &user).await?;
            sections.push(ReportSection {
                kind,
                heading,
                text,
            });
        }

        info!("Generated {} report section(s)", sections.len());
        Ok(sections)
    }

    #[instrument(skip(self, system, user), fields(model = %self.config.model))]
    async fn generate_section(
        &mut self,
        section: SectionKind,
        system: &str,
        user: &str,
    ) -> Result<String> {
        let mut attempt = 0;
        let mut transient_failures = 0;
        let mut unusable_answers = 0;

        loop {
            attempt += 1;
            self.state = ChainState::Generating { section, attempt };
            debug!("Calling model for '{}' (attempt {})", section, attempt);

            let outcome = self.call(system, user).await;
            match outcome {
                Ok(response) => {
                    let text = response.text();
                    let unusable = if response.is_refusal() {
                        Some(Unusable::Declined)
                    } else if text.is_empty() {
                        Some(Unusable::Empty)
                    } else {
                        None
                    };

                    let Some(reason) = unusable else {
                        debug!(
                            "Section '{}' written, {} tokens",
                            section,
                            response.usage.total()
                        );
                        return Ok(text);
                    };

                    unusable_answers += 1;
                    if unusable_answers > UNUSABLE_ANSWER_RETRIES {
                        return Err(match reason {
                            Unusable::Declined => GenerationError::Declined { section },
                            Unusable::Empty => GenerationError::EmptyResponse { section },
                        });
                    }
                    warn!("Unusable answer for '{}' ({:?}), asking again", section, reason);
                }
                Err(e)
                    if e.is_retryable()
                        && transient_failures + 1 < self.config.retry.max_attempts =>
                {
                    transient_failures += 1;
                    let backoff = self.config.retry.backoff_duration(transient_failures);
                    warn!(
                        "Section '{}' attempt {} failed: {}. Retrying in {:?}",
                        section, attempt, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(source) => {
                    return Err(GenerationError::Provider {
                        section,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn call(
        &self,
        system: &str,
        user: &str,
    ) -> sitrep_llm::Result<sitrep_llm::CompletionResponse> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .system(system)
            .add_message(Message::user(user))
            .max_tokens(self.config.max_tokens);
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }

        let timeout = self.config.call_timeout;
        tokio::time::timeout(timeout, self.provider.complete(builder.build()))
            .await
            .unwrap_or(Err(LLMError::Timeout(timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use sitrep_core::{
        ArticleId, ArticleLookup, ChartReference, ClassifyError, ErrorKind, MetricsSummary,
        NewsArticle,
    };
    use sitrep_llm::{CompletionResponse, StopReason, TokenUsage};
    use sitrep_prompt::PromptAssembler;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mockall::mock! {
        Provider {}

        #[async_trait]
        impl LLMProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> sitrep_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    enum Step {
        Refuse,
        Empty,
        Fail(LLMError),
        Hang,
    }

    /// Plays scripted steps, then answers every call with its section heading
    #[derive(Default)]
    struct ScriptedProvider {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn with_steps(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                ..Self::default()
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn reply(text: &str, stop_reason: StopReason) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason,
            usage: TokenUsage::default(),
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> sitrep_llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                None => Ok(reply("Texto da seção.", StopReason::EndTurn)),
                Some(Step::Refuse) => Ok(reply("", StopReason::Refusal)),
                Some(Step::Empty) => Ok(reply("   ", StopReason::EndTurn)),
                Some(Step::Fail(e)) => Err(e),
                Some(Step::Hang) => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(reply("too late", StopReason::EndTurn))
                }
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct NoArticles;

    impl ArticleLookup for NoArticles {
        fn article(&self, _id: &ArticleId) -> Option<&NewsArticle> {
            None
        }
    }

    fn package() -> PromptPackage {
        let metrics = MetricsSummary::new(
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            "Case count rose 12% over 7 days",
        );
        let charts = [ChartReference::new("Casos diários", "out/daily.png").with_period("30 dias")];
        PromptAssembler::new(4_000, Language::Portuguese)
            .assemble(&metrics, &charts, &[], &NoArticles)
            .unwrap()
    }

    fn config() -> GenerationConfig {
        GenerationConfig {
            call_timeout: Duration::from_millis(20),
            retry: RetryPolicy::fast(),
            ..GenerationConfig::default()
        }
    }

    fn chain(provider: Arc<dyn LLMProvider>) -> ReportGenerationChain {
        ReportGenerationChain::new(provider, config(), &Language::Portuguese).unwrap()
    }

    #[tokio::test]
    async fn test_two_timeouts_then_success() {
        let provider = ScriptedProvider::with_steps(vec![Step::Hang, Step::Hang]);
        let mut chain = chain(provider.clone());

        let sections = chain.generate(&package()).await.unwrap();

        let kinds: Vec<_> = sections.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ALL);
        assert_eq!(provider.calls(), SectionKind::ALL.len() + 2);
        assert_eq!(chain.state(), ChainState::Complete);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_whole_chain() {
        let server_error = || {
            Step::Fail(LLMError::ServerError {
                status: 503,
                message: "overloaded".to_string(),
            })
        };
        let provider = ScriptedProvider::with_steps(vec![
            Step::Empty,
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
            server_error(),
            server_error(),
            server_error(),
        ]);
        let mut chain = chain(provider.clone());

        let err = chain.generate(&package()).await.unwrap_err();

        // first section: empty then timeout then ok; second section: three failures
        assert!(matches!(
            err,
            GenerationError::Provider {
                section: SectionKind::MetricsAnalysis,
                attempts: 3,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert_eq!(provider.calls(), 6);
        assert_eq!(
            chain.state(),
            ChainState::Failed {
                section: Some(SectionKind::MetricsAnalysis)
            }
        );
    }

    #[tokio::test]
    async fn test_empty_answer_does_not_spend_transient_budget() {
        let provider = ScriptedProvider::with_steps(vec![
            Step::Empty,
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
        ]);
        let mut chain = chain(provider.clone());

        let sections = chain.generate(&package()).await.unwrap();

        // empty, two timeouts, then the third transient-budget call succeeds
        assert_eq!(sections.len(), 5);
        assert_eq!(provider.calls(), SectionKind::ALL.len() + 3);
        assert_eq!(chain.state(), ChainState::Complete);
    }

    #[tokio::test]
    async fn test_transient_budget_exhausted_after_empty_answer() {
        let provider = ScriptedProvider::with_steps(vec![
            Step::Empty,
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
            Step::Fail(LLMError::Timeout(Duration::ZERO)),
        ]);
        let mut chain = chain(provider.clone());

        let err = chain.generate(&package()).await.unwrap_err();

        assert!(matches!(
            err,
            GenerationError::Provider {
                section: SectionKind::ContextOverview,
                attempts: 4,
                source: LLMError::Timeout(_),
            }
        ));
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let provider = ScriptedProvider::with_steps(vec![Step::Fail(LLMError::AuthenticationFailed)]);
        let mut chain = chain(provider.clone());

        let err = chain.generate(&package()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_answer_retried_once() {
        let provider = ScriptedProvider::with_steps(vec![Step::Empty]);
        let mut chain = chain(provider.clone());

        let sections = chain.generate(&package()).await.unwrap();
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[0].text, "Texto da seção.");
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_declined_twice_is_fatal() {
        let mut mock = MockProvider::new();
        mock.expect_complete()
            .times(2)
            .returning(|_| Ok(reply("", StopReason::Refusal)));
        let mut chain = chain(Arc::new(mock));

        let err = chain.generate(&package()).await.unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Declined {
                section: SectionKind::ContextOverview
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_news_still_produces_every_section() {
        let provider = Arc::new(ScriptedProvider::default());
        let mut chain = chain(provider.clone());

        let sections = chain.generate(&package()).await.unwrap();
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[2].heading, "Contexto das notícias");

        let requests = provider.requests.lock().unwrap();
        let news_request = requests[2].messages[0].text().unwrap();
        assert!(news_request.contains("Nenhum contexto de notícias atual disponível."));
        assert!(news_request.contains("não cite nem invente"));
        let chart_request = requests[4].messages[0].text().unwrap();
        assert!(chart_request.contains("- Casos diários (30 dias)"));
    }

    #[tokio::test]
    async fn test_requests_carry_persona_and_settings() {
        let provider = Arc::new(ScriptedProvider::default());
        let mut chain = chain(provider.clone());
        chain.generate(&package()).await.unwrap();

        let requests = provider.requests.lock().unwrap();
        let first = &requests[0];
        assert_eq!(first.model, "claude-3-5-haiku-latest");
        assert_eq!(first.temperature, Some(0.0));
        assert!(first.system.as_deref().unwrap().contains("surtos de SRAG"));
        assert!(first.messages[0].text().unwrap().contains("Case count rose 12%"));
    }
}
