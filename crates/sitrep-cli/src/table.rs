//! Parameter summary table

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

/// Two-column table of the run parameters
pub fn parameter_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Parameter", "Value"]);

    for (label, value) in rows {
        table.add_row(vec![(*label).to_string(), value.clone()]);
    }
    table
}
