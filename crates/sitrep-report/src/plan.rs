//! Which sections a report has, in which order

use crate::prompts;
use sitrep_core::SectionKind;
use sitrep_prompt::{JinjaTemplate, Language, Result};

/// A section waiting to be generated
#[derive(Debug)]
pub struct PlannedSection {
    pub kind: SectionKind,
    pub heading: String,
    pub instruction: JinjaTemplate,
}

/// Ordered list of sections to generate
#[derive(Debug)]
pub struct SectionPlan {
    sections: Vec<PlannedSection>,
}

impl SectionPlan {
    /// Every [`SectionKind`] in report order
    pub fn standard(lang: &Language) -> Result<Self> {
        Self::with_sections(&SectionKind::ALL, lang)
    }

    /// A plan for the given sections, kept in the order given
    pub fn with_sections(kinds: &[SectionKind], lang: &Language) -> Result<Self> {
        let sections = kinds
            .iter()
            .map(|&kind| {
                Ok(PlannedSection {
                    kind,
                    heading: prompts::heading(kind, lang).to_string(),
                    instruction: prompts::instruction(kind)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[PlannedSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_order() {
        let plan = SectionPlan::standard(&Language::Portuguese).unwrap();
        let kinds: Vec<_> = plan.sections().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ALL);
        assert_eq!(plan.sections()[0].heading, "Contexto geral");
    }

    #[test]
    fn test_custom_plan_keeps_order() {
        let plan = SectionPlan::with_sections(
            &[SectionKind::Recommendations, SectionKind::ContextOverview],
            &Language::English,
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.sections()[0].kind, SectionKind::Recommendations);
    }
}
