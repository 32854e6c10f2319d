//! Final report composition and Markdown rendering

use chrono::{DateTime, Utc};
use sitrep_core::{FinalReport, ReportSection, SectionKind};
use sitrep_prompt::{Labels, Language, PromptBuilder, PromptPackage};

/// Bundle generated sections with the package's date and charts
pub fn compose_report(
    title: impl Into<String>,
    package: &PromptPackage,
    sections: Vec<ReportSection>,
    generated_at: DateTime<Utc>,
) -> FinalReport {
    FinalReport {
        title: title.into(),
        as_of: package.metrics().as_of,
        sections,
        charts: package.charts().to_vec(),
        generated_at,
    }
}

/// Render a report as Markdown
///
/// Chart images follow the chart introduction section, or close the report when
/// there is no such section.
pub fn render_markdown(report: &FinalReport, lang: &Language) -> String {
    let labels = Labels::for_language(lang);
    let mut builder = PromptBuilder::new()
        .text(format!("# {}\n", report.title))
        .newline()
        .text(format!(
            "_{} {}_\n",
            capitalize(labels.data_up_to),
            report.as_of.format(labels.date_format)
        ))
        .newline();

    let mut charts_placed = false;
    for section in &report.sections {
        builder = builder
            .section(&section.heading)
            .newline()
            .text(section.text.trim())
            .blank_line();
        if section.kind == SectionKind::ChartIntroduction {
            builder = chart_images(builder, report);
            charts_placed = true;
        }
    }
    if !charts_placed {
        builder = chart_images(builder, report);
    }

    let mut markdown = builder.build_trimmed();
    markdown.push('\n');
    markdown
}

fn chart_images(mut builder: PromptBuilder, report: &FinalReport) -> PromptBuilder {
    for chart in &report.charts {
        builder = builder
            .text(format!("![{}]({})", chart.title, chart.path.display()))
            .blank_line();
    }
    builder
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use sitrep_core::ChartReference;

    fn report(sections: Vec<ReportSection>) -> FinalReport {
        FinalReport {
            title: "Relatório Técnico do Panorama de SRAG".to_string(),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            sections,
            charts: vec![ChartReference::new("Casos diários", "out/daily.png")],
            generated_at: Utc.with_ymd_and_hms(2025, 6, 11, 8, 0, 0).unwrap(),
        }
    }

    fn section(kind: SectionKind, heading: &str, text: &str) -> ReportSection {
        ReportSection {
            kind,
            heading: heading.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_markdown_layout() {
        let markdown = render_markdown(
            &report(vec![
                section(SectionKind::ContextOverview, "Contexto geral", "Abertura."),
                section(SectionKind::ChartIntroduction, "Gráficos", "O gráfico mostra."),
                section(SectionKind::Recommendations, "Considerações", "Monitorar."),
            ]),
            &Language::Portuguese,
        );

        assert!(markdown.starts_with("# Relatório Técnico do Panorama de SRAG\n\n_Dados até 10/06/2025_\n"));
        assert!(markdown.contains("## Contexto geral\n\nAbertura.\n\n"));
        let image = markdown.find("![Casos diários](out/daily.png)").unwrap();
        let charts = markdown.find("## Gráficos").unwrap();
        let closing = markdown.find("## Considerações").unwrap();
        assert!(charts < image && image < closing);
        assert!(markdown.ends_with("Monitorar.\n"));
    }

    #[test]
    fn test_charts_appended_without_chart_section() {
        let markdown = render_markdown(
            &report(vec![section(SectionKind::ContextOverview, "Overview", "Text.")]),
            &Language::English,
        );
        assert!(markdown.contains("_Data up to 2025-06-10_"));
        assert!(markdown.trim_end().ends_with("![Casos diários](out/daily.png)"));
    }
}
