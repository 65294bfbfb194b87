use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Variable, VariableType};

static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-local row identity. Never reused, unrelated to the variable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    fn next() -> Self {
        Self(NEXT_ROW_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Edit state of a row relative to the remote copy it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Matches what was loaded.
    Existing,
    /// Has no remote counterpart yet.
    New,
    /// Changed locally; `snapshot` holds the fields as loaded.
    Edited { snapshot: Variable },
    /// Marked for removal. Keeps the snapshot of an edited row around.
    Deleted { snapshot: Option<Variable> },
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Existing => "existing",
            RowStatus::New => "new",
            RowStatus::Edited { .. } => "edited",
            RowStatus::Deleted { .. } => "deleted",
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, RowStatus::Deleted { .. })
    }

    pub fn snapshot(&self) -> Option<&Variable> {
        match self {
            RowStatus::Edited { snapshot } => Some(snapshot),
            RowStatus::Deleted { snapshot } => snapshot.as_ref(),
            RowStatus::Existing | RowStatus::New => None,
        }
    }
}

/// Validation tags attached to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowError {
    KeyRequired,
    DuplicateKey,
    MaskedMinLength,
}

impl RowError {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowError::KeyRequired => "key_required",
            RowError::DuplicateKey => "duplicate_key_warning",
            RowError::MaskedMinLength => "masked_min_length_warning",
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEdit {
    Key(String),
    Value(String),
    VariableType(VariableType),
    Protected(bool),
    Masked(bool),
    EnvironmentScope(String),
    Description(Option<String>),
}

impl RowEdit {
    fn apply_to(self, variable: &mut Variable) {
        match self {
            RowEdit::Key(key) => variable.key = key,
            RowEdit::Value(value) => variable.value = value,
            RowEdit::VariableType(kind) => variable.variable_type = kind,
            RowEdit::Protected(protected) => variable.protected = protected,
            RowEdit::Masked(masked) => variable.masked = masked,
            RowEdit::EnvironmentScope(scope) => variable.environment_scope = scope,
            RowEdit::Description(description) => variable.description = description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Never saved; the owning table must drop the row.
    Remove,
    Tombstoned,
    /// Already deleted.
    Unchanged,
}

/// Local working copy of a variable plus its edit bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarRow {
    id: RowId,
    variable: Variable,
    status: RowStatus,
    original_key: String,
    masked_on_server: bool,
    errors: Vec<RowError>,
}

impl EnvVarRow {
    pub fn from_remote(variable: Variable) -> Self {
        Self {
            id: RowId::next(),
            original_key: variable.key.clone(),
            masked_on_server: variable.masked,
            variable,
            status: RowStatus::Existing,
            errors: Vec::new(),
        }
    }

    pub fn new_row(variable: Variable) -> Self {
        Self {
            id: RowId::next(),
            variable,
            status: RowStatus::New,
            original_key: String::new(),
            masked_on_server: false,
            errors: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new_row(Variable::new("", ""))
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn key(&self) -> &str {
        &self.variable.key
    }

    pub fn status(&self) -> &RowStatus {
        &self.status
    }

    pub fn original_key(&self) -> &str {
        &self.original_key
    }

    pub fn masked_on_server(&self) -> bool {
        self.masked_on_server
    }

    pub fn original_snapshot(&self) -> Option<&Variable> {
        self.status.snapshot()
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }

    pub fn is_renamed(&self) -> bool {
        !self.original_key.is_empty() && self.original_key != self.variable.key
    }

    /// Scope the remote copy lives under, i.e. before any local edit.
    pub fn remote_scope(&self) -> &str {
        self.status
            .snapshot()
            .map(|s| s.environment_scope.as_str())
            .unwrap_or(&self.variable.environment_scope)
    }

    /// Apply a field change. Deleted rows are read-only and return `false`.
    pub fn apply(&mut self, edit: RowEdit) -> bool {
        match &self.status {
            RowStatus::Deleted { .. } => return false,
            RowStatus::Existing => {
                self.status = RowStatus::Edited {
                    snapshot: self.variable.clone(),
                };
            }
            RowStatus::New | RowStatus::Edited { .. } => {}
        }
        edit.apply_to(&mut self.variable);
        true
    }

    pub fn mark_deleted(&mut self) -> DeleteOutcome {
        let status = std::mem::replace(&mut self.status, RowStatus::Existing);
        let (status, outcome) = match status {
            RowStatus::New => (RowStatus::New, DeleteOutcome::Remove),
            RowStatus::Existing => (
                RowStatus::Deleted { snapshot: None },
                DeleteOutcome::Tombstoned,
            ),
            RowStatus::Edited { snapshot } => (
                RowStatus::Deleted {
                    snapshot: Some(snapshot),
                },
                DeleteOutcome::Tombstoned,
            ),
            deleted @ RowStatus::Deleted { .. } => (deleted, DeleteOutcome::Unchanged),
        };
        self.status = status;
        outcome
    }

    /// Restore the pre-edit fields. Only meaningful for edited rows.
    pub fn undo_edit(&mut self) -> bool {
        let status = std::mem::replace(&mut self.status, RowStatus::Existing);
        match status {
            RowStatus::Edited { snapshot } => {
                self.variable = snapshot;
                self.errors.clear();
                true
            }
            other => {
                self.status = other;
                false
            }
        }
    }

    /// Field values are left as they are.
    pub fn undo_delete(&mut self) -> bool {
        if !self.status.is_deleted() {
            return false;
        }
        self.status = RowStatus::Existing;
        true
    }

    pub(crate) fn set_errors(&mut self, errors: Vec<RowError>) {
        self.errors = errors;
    }
}
