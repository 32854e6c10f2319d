//! Fluent prompt builder
//!
//! [`PromptBuilder`] assembles prompt text piece by piece. The prompt package
//! renders every block through it so block lengths can be measured before they
//! are joined.

/// A fluent builder for constructing prompt text
///
/// # Examples
///
/// ```
/// use sitrep_prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new()
///     .section("Metrics")
///     .bullet("Case variation (7 days): 12.00%")
///     .build();
///
/// assert!(prompt.contains("## Metrics"));
/// assert!(prompt.contains("- Case variation"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    parts: Vec<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add static text
    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.parts.push(content.into());
        self
    }

    /// Add a newline
    pub fn newline(self) -> Self {
        self.text("\n")
    }

    /// Add a blank line (two newlines)
    pub fn blank_line(self) -> Self {
        self.text("\n\n")
    }

    /// Add a section header (markdown h2)
    pub fn section(self, title: impl Into<String>) -> Self {
        self.text(format!("## {}\n", title.into()))
    }

    /// Add a subsection header (markdown h3)
    pub fn subsection(self, title: impl Into<String>) -> Self {
        self.text(format!("### {}\n", title.into()))
    }

    /// Add a bullet point
    pub fn bullet(self, content: impl Into<String>) -> Self {
        self.text(format!("- {}\n", content.into()))
    }

    /// Add a key-value bullet
    pub fn field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.text(format!("- {}: {}\n", key.into(), value.into()))
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        self.parts.join("")
    }

    /// Build with trimmed whitespace
    pub fn build_trimmed(self) -> String {
        self.build().trim().to_string()
    }

    /// Check if the builder is empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl From<PromptBuilder> for String {
    fn from(builder: PromptBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_text() {
        let prompt = PromptBuilder::new().text("Hello").text(", World!").build();
        assert_eq!(prompt, "Hello, World!");
    }

    #[test]
    fn test_blank_line() {
        let prompt = PromptBuilder::new()
            .text("Paragraph 1")
            .blank_line()
            .text("Paragraph 2")
            .build();
        assert_eq!(prompt, "Paragraph 1\n\nParagraph 2");
    }

    #[test]
    fn test_sections_and_fields() {
        let prompt = PromptBuilder::new()
            .section("Notícias")
            .subsection("1. Casos sobem")
            .field("URL", "https://example.com")
            .build();
        assert_eq!(
            prompt,
            "## Notícias\n### 1. Casos sobem\n- URL: https://example.com\n"
        );
    }

    #[test]
    fn test_build_trimmed_and_empty() {
        assert!(PromptBuilder::new().is_empty());
        let prompt = PromptBuilder::new()
            .newline()
            .text("Content")
            .newline()
            .build_trimmed();
        assert_eq!(prompt, "Content");
    }

    #[test]
    fn test_into_string() {
        let s: String = PromptBuilder::new().bullet("x").into();
        assert_eq!(s, "- x\n");
    }
}
