//! Fixed prompt wording per language

use crate::Language;
use chrono::NaiveDate;

/// Headings and field names used in the prompt body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub metrics_header: &'static str,
    pub data_up_to: &'static str,
    /// `chrono` format string for dates shown in the prompt
    pub date_format: &'static str,
    pub news_header: &'static str,
    pub no_news: &'static str,
    pub charts_header: &'static str,
    pub no_charts: &'static str,
    pub url: &'static str,
    pub published: &'static str,
    pub source: &'static str,
    pub description: &'static str,
}

const ENGLISH: Labels = Labels {
    metrics_header: "Epidemiological metrics",
    data_up_to: "data up to",
    date_format: "%Y-%m-%d",
    news_header: "Relevant recent news",
    no_news: "No current news context available.",
    charts_header: "Charts",
    no_charts: "No charts available.",
    url: "URL",
    published: "Published",
    source: "Source",
    description: "Description",
};

const PORTUGUESE: Labels = Labels {
    metrics_header: "Métricas epidemiológicas",
    data_up_to: "dados até",
    date_format: "%d/%m/%Y",
    news_header: "Notícias recentes relevantes",
    no_news: "Nenhum contexto de notícias atual disponível.",
    charts_header: "Gráficos",
    no_charts: "Nenhum gráfico disponível.",
    url: "URL",
    published: "Publicado em",
    source: "Fonte",
    description: "Descrição",
};

impl Labels {
    /// Labels for `lang`; unknown languages use English
    pub fn for_language(lang: &Language) -> &'static Labels {
        match lang {
            Language::Portuguese => &PORTUGUESE,
            Language::English | Language::Other(_) => &ENGLISH,
        }
    }

    /// "Epidemiological metrics (data up to 2025-06-10)"
    pub fn dated_metrics_header(&self, as_of: NaiveDate) -> String {
        format!(
            "{} ({} {})",
            self.metrics_header,
            self.data_up_to,
            as_of.format(self.date_format)
        )
    }
}
