use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::parser::ParsedEnvVar;
use super::row::{EnvVarRow, RowEdit, RowId};
use super::table::EnvVarTable;
use crate::models::Variable;

/// Protection flags given to rows created by an import.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ImportPreset {
    #[default]
    Unprotected,
    Protected,
    ProtectedMasked,
}

impl ImportPreset {
    /// `(protected, masked)`
    pub fn flags(&self) -> (bool, bool) {
        match self {
            ImportPreset::Unprotected => (false, false),
            ImportPreset::Protected => (true, false),
            ImportPreset::ProtectedMasked => (true, true),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub imported: usize,
    pub merged: usize,
}

/// Fold parsed pairs into the table.
///
/// A key that matches a live row overwrites that row's value; anything else
/// becomes a new row with the preset's flags. Deleted rows never match and
/// nothing is ever removed. Repeated keys within one import land on the same
/// row, last value wins.
pub fn merge_parsed(
    table: &mut EnvVarTable,
    parsed: &[ParsedEnvVar],
    preset: ImportPreset,
) -> MergeSummary {
    let mut by_key: HashMap<String, RowId> = HashMap::new();
    for row in table.rows().iter().filter(|row| !row.is_deleted()) {
        by_key.entry(row.key().to_string()).or_insert(row.id());
    }

    let (protected, masked) = preset.flags();
    let mut summary = MergeSummary::default();

    for pair in parsed {
        let target = by_key.get(&pair.key).copied();
        let row = target.and_then(|id| {
            table
                .rows_mut()
                .iter_mut()
                .find(|row| row.id() == id)
        });

        match row {
            Some(row) => {
                row.apply(RowEdit::Value(pair.value.clone()));
                summary.merged += 1;
            }
            None => {
                let mut variable = Variable::new(pair.key.clone(), pair.value.clone());
                variable.protected = protected;
                variable.masked = masked;
                let id = table.push_row(EnvVarRow::new_row(variable));
                by_key.insert(pair.key.clone(), id);
                summary.imported += 1;
            }
        }
    }

    log::debug!(
        "Merged import: {} new, {} existing ({:?})",
        summary.imported,
        summary.merged,
        preset
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_vars::row::RowStatus;

    fn pairs(items: &[(&str, &str)]) -> Vec<ParsedEnvVar> {
        items.iter().map(|(k, v)| ParsedEnvVar::new(*k, *v)).collect()
    }

    #[test]
    fn matching_key_is_merged_and_snapshotted() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("DB_HOST", "old")]);
        let summary = merge_parsed(
            &mut table,
            &pairs(&[("DB_HOST", "new")]),
            ImportPreset::ProtectedMasked,
        );

        assert_eq!(summary, MergeSummary { imported: 0, merged: 1 });
        let row = &table.rows()[0];
        assert_eq!(row.variable().value, "new");
        assert_eq!(row.status().as_str(), "edited");
        assert_eq!(row.original_snapshot().map(|s| s.value.as_str()), Some("old"));
        assert!(!row.variable().masked, "preset applies to new rows only");
    }

    #[test]
    fn unknown_key_is_imported_with_preset() {
        let mut table = EnvVarTable::new();
        let summary = merge_parsed(
            &mut table,
            &pairs(&[("API_TOKEN", "abcdefghij")]),
            ImportPreset::Protected,
        );

        assert_eq!(summary, MergeSummary { imported: 1, merged: 0 });
        let row = &table.rows()[0];
        assert_eq!(row.status(), &RowStatus::New);
        assert!(row.variable().protected);
        assert!(!row.variable().masked);
        assert_eq!(row.variable().environment_scope, "*");
        assert_eq!(row.variable().variable_type.as_str(), "env_var");
    }

    #[test]
    fn deleted_rows_do_not_match() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("GONE", "1")]);
        let id = table.rows()[0].id();
        table.mark_deleted(id).expect("row exists");

        let summary = merge_parsed(&mut table, &pairs(&[("GONE", "2")]), ImportPreset::Unprotected);

        assert_eq!(summary, MergeSummary { imported: 1, merged: 0 });
        assert_eq!(table.len(), 2);
        assert!(table.rows()[0].is_deleted());
        assert_eq!(table.rows()[0].variable().value, "1");
    }

    #[test]
    fn merging_into_new_or_edited_keeps_status() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("EDITED", "a")]);
        let edited = table.rows()[0].id();
        table
            .update_field(edited, RowEdit::Value("b".into()))
            .expect("row exists");
        table.add_new(Variable::new("FRESH", "x"));

        let summary = merge_parsed(
            &mut table,
            &pairs(&[("EDITED", "c"), ("FRESH", "y")]),
            ImportPreset::Unprotected,
        );

        assert_eq!(summary.merged, 2);
        assert_eq!(table.rows()[0].status().as_str(), "edited");
        assert_eq!(
            table.rows()[0].original_snapshot().map(|s| s.value.as_str()),
            Some("a")
        );
        assert_eq!(table.rows()[1].status(), &RowStatus::New);
        assert_eq!(table.rows()[1].variable().value, "y");
    }

    #[test]
    fn repeated_keys_in_one_import_share_a_row() {
        let mut table = EnvVarTable::new();
        let summary = merge_parsed(
            &mut table,
            &pairs(&[("A", "1"), ("A", "2")]),
            ImportPreset::Unprotected,
        );

        assert_eq!(summary, MergeSummary { imported: 1, merged: 1 });
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].variable().value, "2");
    }

    #[test]
    fn preset_names_match_settings_format() {
        let preset: ImportPreset =
            serde_json::from_str("\"protected_masked\"").expect("parse preset");
        assert_eq!(preset, ImportPreset::ProtectedMasked);
        assert_eq!(preset.flags(), (true, true));
    }
}
