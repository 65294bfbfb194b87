use std::collections::HashMap;

use super::row::RowError;
use super::table::EnvVarTable;
use crate::settings::{AppSettings, DEFAULT_MASKED_MIN_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub masked_min_length: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            masked_min_length: DEFAULT_MASKED_MIN_LENGTH,
        }
    }
}

impl From<&AppSettings> for ValidationRules {
    fn from(settings: &AppSettings) -> Self {
        Self {
            masked_min_length: settings.masked_min_length,
        }
    }
}

/// Recompute every row's error tags and report whether the table may be saved.
///
/// Deleted rows are exempt and do not count toward duplicates.
pub fn validate(table: &mut EnvVarTable, rules: &ValidationRules) -> bool {
    let mut key_count: HashMap<String, usize> = HashMap::new();
    for row in table.rows().iter().filter(|row| !row.is_deleted()) {
        *key_count.entry(row.key().to_string()).or_default() += 1;
    }

    let mut valid = true;
    for row in table.rows_mut() {
        let mut errors = Vec::new();
        if !row.is_deleted() {
            let variable = row.variable();
            if variable.key.trim().is_empty() {
                errors.push(RowError::KeyRequired);
            }
            if !variable.key.is_empty() && key_count.get(&variable.key).copied().unwrap_or(0) > 1 {
                errors.push(RowError::DuplicateKey);
            }
            if variable.masked && variable.value.chars().count() < rules.masked_min_length {
                errors.push(RowError::MaskedMinLength);
            }
        }
        if !errors.is_empty() {
            valid = false;
        }
        row.set_errors(errors);
    }

    valid
}
