//! Report language
//!
//! Prompts and report headings exist in English and Portuguese; any other code is
//! carried through as `Other` and falls back to English text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported languages for prompts
///
/// # Examples
///
/// ```
/// use sitrep_prompt::Language;
///
/// assert_eq!(Language::from_code("pt-BR"), Language::Portuguese);
/// assert_eq!(Language::Portuguese.code(), "pt");
/// assert_eq!(Language::from_code("es"), Language::Other("es".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    #[default]
    English,
    /// Portuguese (Brazil)
    Portuguese,
    /// Other languages (ISO 639-1 code)
    Other(String),
}

impl Language {
    /// Get ISO 639-1 language code
    pub fn code(&self) -> &str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
            Language::Other(code) => code,
        }
    }

    /// Get language name for display
    pub fn name(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Portuguese => "Português",
            Language::Other(code) => code,
        }
    }

    /// Parse from ISO 639-1 code (optionally with region) or common name
    pub fn from_code(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Language::English,
            "pt" | "pt-br" | "pt-pt" | "portuguese" | "português" | "portugues" => {
                Language::Portuguese
            }
            other => Language::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Language::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code("EN"), Language::English);
        assert_eq!(Language::from_code("pt"), Language::Portuguese);
        assert_eq!(Language::from_code("pt-BR"), Language::Portuguese);
        assert_eq!(Language::from_code("Português"), Language::Portuguese);
        assert_eq!(Language::from_code("de"), Language::Other("de".to_string()));
    }

    #[test]
    fn test_code_and_name() {
        assert_eq!(Language::Portuguese.code(), "pt");
        assert_eq!(Language::English.name(), "English");
        assert_eq!(Language::Other("de".to_string()).code(), "de");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Language::Portuguese).unwrap();
        let parsed: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Language::Portuguese);
    }
}
