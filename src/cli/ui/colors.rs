use colored::Colorize;

use crate::env_vars::RowStatus;

pub fn success(text: &str) -> String {
    text.green().to_string()
}

pub fn error(text: &str) -> String {
    text.red().to_string()
}

pub fn warning(text: &str) -> String {
    text.yellow().to_string()
}

pub fn info(text: &str) -> String {
    text.cyan().to_string()
}

pub fn highlight(text: &str) -> String {
    text.bright_blue().bold().to_string()
}

/// Status column text, coloured the same way across every table.
pub fn status_label(status: &RowStatus) -> String {
    let label = status.as_str();
    match status {
        RowStatus::Existing => label.dimmed().to_string(),
        RowStatus::New => success(label),
        RowStatus::Edited { .. } => warning(label),
        RowStatus::Deleted { .. } => label.red().strikethrough().to_string(),
    }
}
