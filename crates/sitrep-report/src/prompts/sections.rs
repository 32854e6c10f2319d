//! Per-section instructions and headings

use sitrep_core::SectionKind;
use sitrep_prompt::{JinjaTemplate, Language, Result};

/// Instruction for one section
///
/// Variables: `topic`, `has_news`, `charts` (list of `{title, period}`).
pub fn instruction(kind: SectionKind) -> Result<JinjaTemplate> {
    match kind {
        SectionKind::ContextOverview => JinjaTemplate::bilingual(
            "report.section.context_overview",
            "Write the opening of the report: a contextual introduction presenting the recent {{ topic }} scenario.",
            "Escreva a abertura do relatório: uma introdução contextual apresentando o cenário recente da {{ topic }}.",
        ),
        SectionKind::MetricsAnalysis => JinjaTemplate::bilingual(
            "report.section.metrics_analysis",
            "Comment on each metric, highlighting its trend (rise, fall or stability) over its period.",
            "Comente cada métrica, destacando a tendência (alta, queda ou estabilidade) no seu período.",
        ),
        SectionKind::NewsContext => JinjaTemplate::bilingual(
            "report.section.news_context",
            "{% if has_news %}Use the news presented to contextualize or explain the numbers, where possible.{% else %}There is no current news context. State this briefly and do not cite or invent any news.{% endif %}",
            "{% if has_news %}Use as notícias apresentadas para contextualizar ou explicar os números, se possível.{% else %}Não há contexto de notícias atual. Informe isso brevemente e não cite nem invente notícias.{% endif %}",
        ),
        SectionKind::Recommendations => JinjaTemplate::bilingual(
            "report.section.recommendations",
            "Close with considerations, points of attention and follow-up recommendations.",
            "Finalize com considerações, pontos de atenção e recomendações de acompanhamento.",
        ),
        SectionKind::ChartIntroduction => JinjaTemplate::bilingual(
            "report.section.chart_introduction",
            "{% if charts %}Write a short textual introduction for each chart below, in this order:\n{% for chart in charts %}- {{ chart.title }}{% if chart.period %} ({{ chart.period }}){% endif %}\n{% endfor %}{% else %}No charts accompany this report. State this in one sentence.{% endif %}",
            "{% if charts %}Escreva uma breve introdução textual para cada gráfico abaixo, nesta ordem:\n{% for chart in charts %}- {{ chart.title }}{% if chart.period %} ({{ chart.period }}){% endif %}\n{% endfor %}{% else %}Nenhum gráfico acompanha este relatório. Informe isso em uma frase.{% endif %}",
        ),
    }
}

/// Heading printed above a section
pub fn heading(kind: SectionKind, lang: &Language) -> &'static str {
    let portuguese = matches!(lang, Language::Portuguese);
    match (kind, portuguese) {
        (SectionKind::ContextOverview, true) => "Contexto geral",
        (SectionKind::ContextOverview, false) => "Context overview",
        (SectionKind::MetricsAnalysis, true) => "Análise das métricas",
        (SectionKind::MetricsAnalysis, false) => "Metrics analysis",
        (SectionKind::NewsContext, true) => "Contexto das notícias",
        (SectionKind::NewsContext, false) => "News context",
        (SectionKind::Recommendations, true) => "Considerações e recomendações",
        (SectionKind::Recommendations, false) => "Considerations and recommendations",
        (SectionKind::ChartIntroduction, true) => "Gráficos",
        (SectionKind::ChartIntroduction, false) => "Charts",
    }
}
