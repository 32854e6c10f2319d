//! User message template for a section request

use sitrep_prompt::{JinjaTemplate, Result};

/// Grounded body followed by the section instruction
///
/// Variables: `body`, `heading`, `instruction`.
pub fn section_request() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        "report.section_request",
        "{{ body }}\n## Task: {{ heading }}\n{{ instruction }}\n",
        "{{ body }}\n## Tarefa: {{ heading }}\n{{ instruction }}\n",
    )
}
