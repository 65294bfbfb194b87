use crate::env_vars::{
    merge_parsed, parse_env_text, reconcile_with_progress, validate, EnvVarTable, ImportPreset,
    MergeSummary, Mutation, SaveResult, ValidationRules,
};
use crate::error::AppError;
use crate::gateway::{ProjectScope, VariableGateway};

/// Result of a save plus the reload that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub result: SaveResult,
    /// Set when the post-save reload failed; the table then still shows the
    /// pre-save edits.
    pub reload_error: Option<String>,
}

/// Editing session for one project's variables.
///
/// Owns the table and the gateway. Load and save both take `&mut self`, so
/// they can never interleave.
pub struct EnvVarSession<G> {
    gateway: G,
    scope: ProjectScope,
    rules: ValidationRules,
    table: EnvVarTable,
    is_saving: bool,
}

impl<G: VariableGateway> EnvVarSession<G> {
    pub fn new(gateway: G, scope: ProjectScope, rules: ValidationRules) -> Self {
        Self {
            gateway,
            scope,
            rules,
            table: EnvVarTable::new(),
            is_saving: false,
        }
    }

    pub fn scope(&self) -> &ProjectScope {
        &self.scope
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn table(&self) -> &EnvVarTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut EnvVarTable {
        &mut self.table
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Replace the table with the server's current variables. On failure the
    /// table is left as it was.
    pub fn load(&mut self) -> Result<usize, AppError> {
        let variables = self.gateway.list_variables(&self.scope)?;
        let count = variables.len();
        self.table.replace_with_remote(variables);
        log::debug!("Loaded {count} variable(s) for {}", self.scope);
        Ok(count)
    }

    /// Parse `text` and merge it in. `None` when the text is not env content.
    pub fn import_text(&mut self, text: &str, preset: ImportPreset) -> Option<MergeSummary> {
        let parsed = parse_env_text(text)?;
        Some(merge_parsed(&mut self.table, &parsed, preset))
    }

    pub fn validate(&mut self) -> bool {
        validate(&mut self.table, &self.rules)
    }

    pub fn save(&mut self) -> Result<SaveReport, AppError> {
        self.save_with_progress(|_, _, _| {})
    }

    /// Validate, push every pending change, then reload from the server.
    ///
    /// Invalid tables are rejected before anything is sent. Per-item remote
    /// failures end up in the report; the reload happens regardless.
    pub fn save_with_progress<F>(&mut self, on_step: F) -> Result<SaveReport, AppError>
    where
        F: FnMut(usize, usize, &Mutation),
    {
        if self.is_saving {
            return Err(AppError::SaveInProgress);
        }
        if !self.validate() {
            let invalid_rows = self
                .table
                .rows()
                .iter()
                .filter(|row| !row.errors().is_empty())
                .count();
            return Err(AppError::Validation { invalid_rows });
        }

        self.is_saving = true;
        let outcome = reconcile_with_progress(&self.table, &self.gateway, &self.scope, on_step);
        self.is_saving = false;
        let result = outcome?;

        let reload_error = match self.load() {
            Ok(_) => None,
            Err(err) => {
                log::warn!("Reload after save failed for {}: {}", self.scope, err);
                Some(err.to_string())
            }
        };

        Ok(SaveReport {
            result,
            reload_error,
        })
    }
}
