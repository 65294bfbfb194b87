mod colors;

pub use colors::{error, highlight, info, status_label, success, warning};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Masked values are never echoed in full.
pub fn display_value(value: &str, masked: bool) -> String {
    if masked {
        return "********".to_string();
    }
    const MAX: usize = 48;
    let flat = value.replace('\n', "⏎");
    if flat.chars().count() > MAX {
        let head: String = flat.chars().take(MAX - 1).collect();
        format!("{head}…")
    } else {
        flat
    }
}
