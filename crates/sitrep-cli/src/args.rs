//! Command-line arguments

use clap::{Parser, ValueEnum};
use sitrep_core::PipelineConfig;
use std::path::PathBuf;

/// Where news and query embeddings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint
    Openai,
    /// Feature hashing; offline and deterministic
    Hashing,
    /// Local ONNX model (needs the `local-embeddings` feature)
    Fastembed,
}

#[derive(Parser, Debug)]
#[command(name = "sitrep", version)]
#[command(about = "Generate an SRAG epidemiological surveillance report", long_about = None)]
pub struct Args {
    /// Pipeline configuration file (JSON); flags below override its values
    #[arg(short, long, env = "SITREP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Precomputed metrics file (JSON)
    #[arg(long, env = "SITREP_METRICS", default_value = "data/processed/metrics.json")]
    pub metrics: PathBuf,

    /// Directory holding the rendered chart images
    #[arg(long, env = "SITREP_CHARTS_DIR", default_value = "data/processed/charts")]
    pub charts_dir: PathBuf,

    /// Serve news from a NewsAPI JSON snapshot instead of the live API
    #[arg(long)]
    pub news_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = EmbeddingBackend::Openai)]
    pub embedding_provider: EmbeddingBackend,

    /// Base URL of the OpenAI-compatible embeddings API
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,

    /// Surveillance topic
    #[arg(long)]
    pub topic: Option<String>,

    /// Query used to rank news against
    #[arg(long)]
    pub query: Option<String>,

    /// Report language (`pt` or `en`)
    #[arg(short, long)]
    pub language: Option<String>,

    /// News window in days, ending today
    #[arg(long)]
    pub window_days: Option<u32>,

    #[arg(long)]
    pub max_news: Option<usize>,

    /// Number of news articles passed to the prompt
    #[arg(long)]
    pub top_k: Option<usize>,

    #[arg(long)]
    pub max_prompt_chars: Option<usize>,

    #[arg(long)]
    pub embedding_model: Option<String>,

    #[arg(long)]
    pub generation_model: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Run without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Args {
    /// Configuration file (or defaults) with flag overrides applied, validated
    pub fn pipeline_config(&self) -> sitrep_core::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(topic) = &self.topic {
            config.topic.clone_from(topic);
        }
        if let Some(query) = &self.query {
            config.search_query.clone_from(query);
        }
        if let Some(language) = &self.language {
            config.language.clone_from(language);
        }
        if let Some(days) = self.window_days {
            config.window = None;
            config.window_days = days;
        }
        if let Some(max) = self.max_news {
            config.max_news_results = max;
        }
        if let Some(k) = self.top_k {
            config.top_k = k;
        }
        if let Some(max) = self.max_prompt_chars {
            config.max_prompt_chars = max;
        }
        if let Some(model) = &self.embedding_model {
            config.embedding_model.clone_from(model);
        }
        if let Some(model) = &self.generation_model {
            config.generation_model.clone_from(model);
        }
        if let Some(title) = &self.title {
            config.report_title.clone_from(title);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitrep_core::ConfigError;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sitrep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.embedding_provider, EmbeddingBackend::Openai);
        assert!(!args.yes);

        let config = args.pipeline_config().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "--topic",
            "influenza",
            "--language",
            "en",
            "--top-k",
            "3",
            "--embedding-provider",
            "hashing",
            "--yes",
        ]);
        assert_eq!(args.embedding_provider, EmbeddingBackend::Hashing);
        assert!(args.yes);

        let config = args.pipeline_config().unwrap();
        assert_eq!(config.topic, "influenza");
        assert_eq!(config.language, "en");
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"topic": "SRAG", "top_k": 5, "max_news_results": 40}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = parse(&["--config", &path, "--top-k", "4"])
            .pipeline_config()
            .unwrap();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.max_news_results, 40);
    }

    #[test]
    fn test_zero_bound_rejected() {
        let err = parse(&["--top-k", "0"]).pipeline_config().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "top_k", .. }));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = Args::try_parse_from(["sitrep", "--embedding-provider", "word2vec"]);
        assert!(result.is_err());
    }
}
