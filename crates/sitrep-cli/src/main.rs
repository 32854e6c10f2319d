//! Command-line interface for sitrep

mod args;
mod table;

use anyhow::Context;
use args::{Args, EmbeddingBackend};
use clap::Parser;
use sitrep_agent::{
    AgentOrchestrator, AgentState, FileChartRenderer, JsonMetricsSource, MarkdownReportWriter,
};
use sitrep_core::PipelineConfig;
use sitrep_llm::EmbeddingProvider;
use sitrep_llm::providers::{AnthropicProvider, OpenAIConfig, OpenAIProvider};
use sitrep_news::{NewsApiClient, NewsSource, StaticNewsSource};
use sitrep_prompt::Language;
use sitrep_rag::HashingEmbedder;
use sitrep_utils::{Credentials, LogFormat, init_tracing};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_format = if args.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(log_format, "info");

    let config = args.pipeline_config()?;
    let credentials = Credentials::from_env();

    info!("Starting sitrep for '{}'", config.topic);

    // Every key is resolved here, before any external call
    let generator = AnthropicProvider::with_timeout(
        credentials.require_anthropic()?,
        config.call_timeout(),
    )?;
    let embedder = build_embedder(&args, &config, &credentials)?;
    let news = build_news_source(&args, &config, &credentials)?;

    let mut orchestrator = AgentOrchestrator::builder()
        .metrics(Arc::new(JsonMetricsSource::new(&args.metrics)))
        .charts(Arc::new(FileChartRenderer::new(&args.charts_dir)))
        .news(news)
        .embedder(embedder)
        .generator(Arc::new(generator))
        .assembler(Arc::new(MarkdownReportWriter::new(
            &config.output_dir,
            Language::from_code(&config.language),
        )))
        .config(config)
        .build()?;

    let summary = orchestrator.collect_parameters()?;
    println!("{}", table::parameter_table(&summary.rows()));

    let answer = if args.yes {
        "y".to_string()
    } else {
        prompt("Proceed with report generation? [y/N] ")?
    };
    if orchestrator.confirm(&answer)? == AgentState::Aborted {
        println!("Report generation cancelled.");
        return Ok(());
    }

    match orchestrator.run().await {
        Ok(outcome) => {
            println!(
                "Report written to {} ({} sections, {} of {} news articles used)",
                outcome.artifact.display(),
                outcome.sections,
                outcome.selected_articles,
                outcome.retrieved_articles,
            );
            Ok(())
        }
        Err(e) => {
            if let AgentState::Failed { stage, kind } = orchestrator.state() {
                eprintln!("Report failed at stage '{stage}' ({kind})");
            }
            Err(e.into())
        }
    }
}

fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{question}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(answer)
}

fn build_embedder(
    args: &Args,
    config: &PipelineConfig,
    credentials: &Credentials,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match args.embedding_provider {
        EmbeddingBackend::Openai => {
            let mut openai = OpenAIConfig::new(credentials.require_openai()?)
                .with_timeout(config.call_timeout_secs);
            if let Some(base) = &args.openai_api_base {
                openai = openai.with_api_base(base);
            }
            Ok(Arc::new(OpenAIProvider::with_config(openai)?))
        }
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::default())),
        EmbeddingBackend::Fastembed => local_embedder(),
    }
}

#[cfg(feature = "local-embeddings")]
fn local_embedder() -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(Arc::new(sitrep_rag::LocalEmbedder::new()?))
}

#[cfg(not(feature = "local-embeddings"))]
fn local_embedder() -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    anyhow::bail!("the fastembed backend needs sitrep built with the `local-embeddings` feature")
}

fn build_news_source(
    args: &Args,
    config: &PipelineConfig,
    credentials: &Credentials,
) -> anyhow::Result<Arc<dyn NewsSource>> {
    if let Some(path) = &args.news_file {
        let snapshot = StaticNewsSource::from_json_file(path)?;
        info!("Serving {} article(s) from {}", snapshot.len(), path.display());
        return Ok(Arc::new(snapshot));
    }

    let client = NewsApiClient::new(credentials.require_news()?, config.call_timeout())?
        .with_retry_policy(config.retry_policy())
        .with_page_size(config.max_news_results);
    Ok(Arc::new(client))
}
