use std::collections::HashSet;

use super::row::{DeleteOutcome, EnvVarRow, RowEdit, RowId, RowStatus};
use crate::error::AppError;
use crate::models::Variable;

/// The editable table of variables for one project.
#[derive(Debug, Clone, Default)]
pub struct EnvVarTable {
    rows: Vec<EnvVarRow>,
}

/// How many rows are waiting in each bucket of the next save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingChanges {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}

impl EnvVarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_remote(variables: Vec<Variable>) -> Self {
        Self {
            rows: variables.into_iter().map(EnvVarRow::from_remote).collect(),
        }
    }

    /// Throw away local state and start over from a fresh remote listing.
    pub fn replace_with_remote(&mut self, variables: Vec<Variable>) {
        *self = Self::from_remote(variables);
    }

    pub fn rows(&self) -> &[EnvVarRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [EnvVarRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&EnvVarRow> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// First live (not deleted) row carrying `key`.
    pub fn find_live_by_key(&self, key: &str) -> Option<&EnvVarRow> {
        self.rows
            .iter()
            .find(|row| !row.is_deleted() && row.key() == key)
    }

    pub fn add_empty_row(&mut self) -> RowId {
        self.push_row(EnvVarRow::empty())
    }

    pub fn add_new(&mut self, variable: Variable) -> RowId {
        self.push_row(EnvVarRow::new_row(variable))
    }

    pub(crate) fn push_row(&mut self, row: EnvVarRow) -> RowId {
        let id = row.id();
        self.rows.push(row);
        id
    }

    pub fn update_field(&mut self, id: RowId, edit: RowEdit) -> Result<bool, AppError> {
        Ok(self.row_mut(id)?.apply(edit))
    }

    pub fn mark_deleted(&mut self, id: RowId) -> Result<DeleteOutcome, AppError> {
        let outcome = self.row_mut(id)?.mark_deleted();
        if outcome == DeleteOutcome::Remove {
            self.rows.retain(|row| row.id() != id);
        }
        Ok(outcome)
    }

    pub fn undo_edit(&mut self, id: RowId) -> Result<bool, AppError> {
        Ok(self.row_mut(id)?.undo_edit())
    }

    pub fn undo_delete(&mut self, id: RowId) -> Result<bool, AppError> {
        Ok(self.row_mut(id)?.undo_delete())
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.rows
            .iter()
            .any(|row| !matches!(row.status(), RowStatus::Existing))
    }

    pub fn pending_changes(&self) -> PendingChanges {
        self.rows
            .iter()
            .fold(PendingChanges::default(), |mut acc, row| {
                match row.status() {
                    RowStatus::New => acc.created += 1,
                    RowStatus::Edited { .. } => acc.updated += 1,
                    RowStatus::Deleted { .. } => acc.deleted += 1,
                    RowStatus::Existing => {}
                }
                acc
            })
    }

    /// New rows whose key collides with a variable that is masked on the server.
    ///
    /// Advisory only: creating such a row fails remotely unless the masked
    /// variable is removed or renamed in the same save.
    pub fn masked_key_conflicts(&self) -> Vec<RowId> {
        let masked_keys: HashSet<&str> = self
            .rows
            .iter()
            .filter(|row| !row.is_deleted() && row.masked_on_server())
            .map(|row| row.original_key())
            .collect();

        self.rows
            .iter()
            .filter(|row| matches!(row.status(), RowStatus::New))
            .filter(|row| !row.key().is_empty() && masked_keys.contains(row.key()))
            .map(|row| row.id())
            .collect()
    }

    fn row_mut(&mut self, id: RowId) -> Result<&mut EnvVarRow, AppError> {
        self.rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("Row {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn masked(key: &str) -> Variable {
        let mut var = Variable::new(key, "");
        var.masked = true;
        var
    }

    #[test]
    fn deleting_new_row_removes_it() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("A", "1")]);
        let id = table.add_empty_row();
        assert_eq!(table.len(), 2);

        assert_eq!(table.mark_deleted(id).expect("row exists"), DeleteOutcome::Remove);
        assert_eq!(table.len(), 1);
        assert!(table.row(id).is_none());
    }

    #[test]
    fn deleting_loaded_row_keeps_it_as_tombstone() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("A", "1")]);
        let id = table.rows()[0].id();

        table.mark_deleted(id).expect("row exists");
        assert_eq!(table.len(), 1);
        assert!(table.find_live_by_key("A").is_none());
        assert_eq!(
            table.pending_changes(),
            PendingChanges {
                created: 0,
                updated: 0,
                deleted: 1
            }
        );
    }

    #[test]
    fn unknown_row_is_not_found() {
        let mut other = EnvVarTable::new();
        let foreign = other.add_empty_row();
        let mut table = EnvVarTable::new();
        let err = table
            .update_field(foreign, RowEdit::Value("x".into()))
            .expect_err("row belongs to another table");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn unsaved_changes_tracks_statuses() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("A", "1")]);
        assert!(!table.has_unsaved_changes());

        let id = table.rows()[0].id();
        table
            .update_field(id, RowEdit::Value("2".into()))
            .expect("row exists");
        assert!(table.has_unsaved_changes());

        table.undo_edit(id).expect("row exists");
        assert!(!table.has_unsaved_changes());
    }

    #[test]
    fn masked_conflicts_flag_new_rows_only() {
        let mut table = EnvVarTable::from_remote(vec![masked("SECRET"), Variable::new("PLAIN", "x")]);
        let clash = table.add_new(Variable::new("SECRET", "abcdefgh"));
        table.add_new(Variable::new("PLAIN", "y"));

        assert_eq!(table.masked_key_conflicts(), vec![clash]);

        let secret = table.rows()[0].id();
        table.mark_deleted(secret).expect("row exists");
        assert!(table.masked_key_conflicts().is_empty());
    }

    #[test]
    fn replace_with_remote_discards_local_rows() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("A", "1")]);
        table.add_empty_row();
        table.replace_with_remote(vec![Variable::new("B", "2")]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].key(), "B");
        assert_eq!(table.rows()[0].status(), &RowStatus::Existing);
    }
}
