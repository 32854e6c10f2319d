//! Report assembly boundary
//!
//! The artifact is written to a temporary file in the output directory and renamed
//! into place, so a failed run never leaves a partial report behind.

use crate::error::ReportAssemblyError;
use async_trait::async_trait;
use sitrep_core::FinalReport;
use sitrep_prompt::Language;
use sitrep_report::render_markdown;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Turns a [`FinalReport`] into an artifact and returns its path
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportAssembler: Send + Sync {
    async fn assemble(&self, report: &FinalReport) -> Result<PathBuf, ReportAssemblyError>;
}

/// Writes the report as a Markdown file
#[derive(Debug, Clone)]
pub struct MarkdownReportWriter {
    output_dir: PathBuf,
    file_name: Option<String>,
    language: Language,
}

impl MarkdownReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: None,
            language,
        }
    }

    /// Fixed file name instead of `report_<as-of>.md`
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn target(&self, report: &FinalReport) -> PathBuf {
        let name = self
            .file_name
            .clone()
            .unwrap_or_else(|| format!("report_{}.md", report.as_of.format("%Y%m%d")));
        self.output_dir.join(name)
    }
}

fn write_atomically(dir: &Path, target: &Path, contents: &str) -> Result<(), ReportAssemblyError> {
    let io_err = |source| ReportAssemblyError::Io {
        path: target.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(target).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[async_trait]
impl ReportAssembler for MarkdownReportWriter {
    async fn assemble(&self, report: &FinalReport) -> Result<PathBuf, ReportAssemblyError> {
        let markdown = render_markdown(report, &self.language);
        let dir = self.output_dir.clone();
        let target = self.target(report);

        let written = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &target, &markdown))
            .await
            .map_err(|e| ReportAssemblyError::Task(e.to_string()))??;

        info!("Report written to {}", written.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sitrep_core::{ReportSection, SectionKind};

    fn report() -> FinalReport {
        FinalReport {
            title: "Relatório Técnico do Panorama de SRAG".to_string(),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            sections: vec![ReportSection {
                kind: SectionKind::ContextOverview,
                heading: "Contexto geral".to_string(),
                text: "Abertura.".to_string(),
            }],
            charts: Vec::new(),
            generated_at: Utc.with_ymd_and_hms(2025, 6, 11, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_writes_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("processed");
        let writer = MarkdownReportWriter::new(&out, Language::Portuguese);

        let path = writer.assemble(&report()).await.unwrap();

        assert_eq!(path, out.join("report_20250610.md"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# Relatório Técnico do Panorama de SRAG"));
        assert!(contents.contains("## Contexto geral"));
        // only the final file remains
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_custom_file_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer =
            MarkdownReportWriter::new(dir.path(), Language::English).with_file_name("srag.md");
        std::fs::write(dir.path().join("srag.md"), "old").unwrap();

        let path = writer.assemble(&report()).await.unwrap();
        assert_eq!(path, dir.path().join("srag.md"));
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "old");
    }
}
