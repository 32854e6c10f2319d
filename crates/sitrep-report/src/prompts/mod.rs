//! Report prompt templates
//!
//! - `system`: the analyst persona sent as system prompt
//! - `sections`: one instruction and heading per report section
//! - `user`: the per-section user message

mod sections;
mod system;
mod user;

pub use sections::{heading, instruction};
pub use system::analyst_persona;
pub use user::section_request;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sitrep_core::SectionKind;
    use sitrep_prompt::Language;

    #[test]
    fn test_every_template_parses() {
        analyst_persona().unwrap();
        section_request().unwrap();
        for kind in SectionKind::ALL {
            instruction(kind).unwrap();
        }
    }

    #[test]
    fn test_news_instruction_without_news() {
        let template = instruction(SectionKind::NewsContext).unwrap();
        let text = template
            .render(&Language::Portuguese, &json!({ "has_news": false }))
            .unwrap();
        assert!(text.contains("não cite nem invente"));
    }

    #[test]
    fn test_chart_instruction_lists_charts() {
        let template = instruction(SectionKind::ChartIntroduction).unwrap();
        let text = template
            .render(
                &Language::English,
                &json!({ "charts": [
                    { "title": "Daily cases", "period": "last 30 days" },
                    { "title": "Monthly cases", "period": null },
                ]}),
            )
            .unwrap();
        assert!(text.contains("- Daily cases (last 30 days)\n"));
        assert!(text.contains("- Monthly cases\n"));
    }

    #[test]
    fn test_headings_follow_language() {
        assert_eq!(
            heading(SectionKind::Recommendations, &Language::Portuguese),
            "Considerações e recomendações"
        );
        assert_eq!(
            heading(SectionKind::Recommendations, &Language::Other("es".to_string())),
            "Considerations and recommendations"
        );
    }
}
