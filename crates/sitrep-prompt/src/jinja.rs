//! MiniJinja-backed templates
//!
//! [`JinjaTemplate`] holds one template source per [`Language`] and renders it
//! against any serializable context. Rendering is strict: a variable the template
//! uses but the context lacks is an error rather than an empty string.

use crate::{Language, PromptError, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::collections::HashMap;

/// A prompt template backed by MiniJinja
///
/// # Examples
///
/// ```
/// use sitrep_prompt::{JinjaTemplate, Language};
/// use serde_json::json;
///
/// let template = JinjaTemplate::bilingual(
///     "greeting",
///     "Hello, {{ name }}!",
///     "Olá, {{ name }}!",
/// ).unwrap();
///
/// let pt = template.render(&Language::Portuguese, &json!({ "name": "Brasil" })).unwrap();
/// assert_eq!(pt, "Olá, Brasil!");
/// ```
pub struct JinjaTemplate {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplate {
    /// Create a new template builder
    pub fn builder(name: impl Into<String>) -> JinjaTemplateBuilder {
        JinjaTemplateBuilder::new(name)
    }

    /// Create from a single English template
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        Self::builder(name).english(template).build()
    }

    /// Create with English and Portuguese templates
    pub fn bilingual(
        name: impl Into<String>,
        english: impl Into<String>,
        portuguese: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(name)
            .english(english)
            .portuguese(portuguese)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn languages(&self) -> Vec<Language> {
        self.templates.keys().cloned().collect()
    }

    pub fn supports_language(&self, lang: &Language) -> bool {
        self.templates.contains_key(lang)
    }

    /// Render the template for `lang`
    pub fn render<S: Serialize>(&self, lang: &Language, vars: &S) -> Result<String> {
        let template_str =
            self.templates
                .get(lang)
                .ok_or_else(|| PromptError::TemplateNotFound {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                })?;

        // Fresh environment per render, templates are rendered once per section
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("upper", |s: String| s.to_uppercase());
        env.add_filter("lower", |s: String| s.to_lowercase());
        env.add_filter("trim", |s: String| s.trim().to_string());

        let value = minijinja::Value::from_serialize(vars);

        env.render_str(template_str, value)
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }

    /// Render for `lang`, falling back to English when `lang` has no variant
    pub fn render_with_fallback<S: Serialize>(&self, lang: &Language, vars: &S) -> Result<String> {
        if self.supports_language(lang) {
            self.render(lang, vars)
        } else {
            self.render(&Language::English, vars)
        }
    }
}

impl std::fmt::Debug for JinjaTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaTemplate")
            .field("name", &self.name)
            .field("languages", &self.templates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`JinjaTemplate`]
pub struct JinjaTemplateBuilder {
    name: String,
    templates: HashMap<Language, String>,
}

impl JinjaTemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: HashMap::new(),
        }
    }

    /// Add a template for a specific language
    pub fn template(mut self, lang: Language, content: impl Into<String>) -> Self {
        self.templates.insert(lang, content.into());
        self
    }

    pub fn english(self, content: impl Into<String>) -> Self {
        self.template(Language::English, content)
    }

    pub fn portuguese(self, content: impl Into<String>) -> Self {
        self.template(Language::Portuguese, content)
    }

    /// Build the template
    ///
    /// # Errors
    ///
    /// Returns an error if no templates were provided or one fails to parse.
    pub fn build(self) -> Result<JinjaTemplate> {
        if self.templates.is_empty() {
            return Err(PromptError::NoTemplatesProvided(self.name));
        }

        let env = Environment::new();
        for (lang, content) in &self.templates {
            env.template_from_str(content)
                .map_err(|e| PromptError::TemplateParseFailed {
                    name: self.name.clone(),
                    language: lang.code().to_string(),
                    detail: e.to_string(),
                })?;
        }

        Ok(JinjaTemplate {
            name: self.name,
            templates: self.templates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bilingual_template() {
        let template =
            JinjaTemplate::bilingual("greeting", "Hello, {{ name }}!", "Olá, {{ name }}!").unwrap();

        let en = template
            .render(&Language::English, &json!({ "name": "World" }))
            .unwrap();
        assert_eq!(en, "Hello, World!");

        let pt = template
            .render(&Language::Portuguese, &json!({ "name": "Mundo" }))
            .unwrap();
        assert_eq!(pt, "Olá, Mundo!");
    }

    #[test]
    fn test_builder_languages() {
        let template = JinjaTemplate::builder("test")
            .english("EN: {{ msg }}")
            .template(Language::Other("es".to_string()), "ES: {{ msg }}")
            .build()
            .unwrap();

        assert_eq!(template.name(), "test");
        assert_eq!(template.languages().len(), 2);
        assert!(template.supports_language(&Language::English));
        assert!(!template.supports_language(&Language::Portuguese));
    }

    #[test]
    fn test_filters() {
        let template = JinjaTemplate::new("test", "{{ name | upper }}").unwrap();
        let result = template
            .render(&Language::English, &json!({ "name": "srag" }))
            .unwrap();
        assert_eq!(result, "SRAG");
    }

    #[test]
    fn test_no_templates_error() {
        let result = JinjaTemplate::builder("test").build();
        assert!(matches!(result, Err(PromptError::NoTemplatesProvided(_))));
    }

    #[test]
    fn test_invalid_template_error() {
        let result = JinjaTemplate::new("test", "{{ unclosed");
        assert!(matches!(result, Err(PromptError::TemplateParseFailed { .. })));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let template = JinjaTemplate::new("test", "Hello, {{ name }}!").unwrap();
        let result = template.render(&Language::English, &json!({}));
        assert!(matches!(result, Err(PromptError::RenderError { .. })));
    }

    #[test]
    fn test_render_missing_language() {
        let template = JinjaTemplate::new("test", "Hello").unwrap();
        let result = template.render(&Language::Portuguese, &json!({}));
        assert!(matches!(result, Err(PromptError::TemplateNotFound { .. })));
    }

    #[test]
    fn test_fallback_to_english() {
        let template = JinjaTemplate::bilingual("test", "Hello", "Olá").unwrap();
        let result = template
            .render_with_fallback(&Language::Other("de".to_string()), &json!({}))
            .unwrap();
        assert_eq!(result, "Hello");
    }

    #[test]
    fn test_conditional_and_loop() {
        let template = JinjaTemplate::new(
            "charts",
            "{% if charts %}{% for c in charts %}- {{ c }}\n{% endfor %}{% else %}none{% endif %}",
        )
        .unwrap();

        let listed = template
            .render(&Language::English, &json!({ "charts": ["daily", "monthly"] }))
            .unwrap();
        assert_eq!(listed, "- daily\n- monthly\n");

        let empty = template
            .render(&Language::English, &json!({ "charts": [] }))
            .unwrap();
        assert_eq!(empty, "none");
    }
}
