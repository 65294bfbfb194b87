use std::fmt;

use super::row::{EnvVarRow, RowStatus};
use super::table::EnvVarTable;
use crate::error::AppError;
use crate::gateway::{ProjectScope, VariableGateway};
use crate::models::Variable;

/// One remote step of a save, in the order it will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Delete {
        key: String,
        environment_scope: String,
    },
    Update {
        variable: Variable,
    },
    /// Delete the remote entry, then create `variable`. Used for renames and
    /// for variables that are masked on the server.
    Replace {
        old_key: String,
        old_scope: String,
        variable: Variable,
    },
    Create {
        variable: Variable,
    },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Delete { .. } => MutationKind::Delete,
            Mutation::Update { .. } | Mutation::Replace { .. } => MutationKind::Update,
            Mutation::Create { .. } => MutationKind::Create,
        }
    }

    /// Key the outcome of this step is reported under.
    pub fn key(&self) -> &str {
        match self {
            Mutation::Delete { key, .. } => key,
            Mutation::Update { variable }
            | Mutation::Replace { variable, .. }
            | Mutation::Create { variable } => &variable.key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Delete,
    Update,
    Create,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Delete => "delete",
            MutationKind::Update => "update",
            MutationKind::Create => "create",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFailure {
    pub kind: MutationKind,
    pub key: String,
    pub message: String,
}

impl fmt::Display for SaveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.kind, self.key, self.message)
    }
}

/// Aggregate outcome of a save. Counters only move on confirmed success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveResult {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: Vec<SaveFailure>,
}

impl SaveResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, mutation: &Mutation, outcome: Result<(), AppError>) {
        let kind = mutation.kind();
        match outcome {
            Ok(()) => match kind {
                MutationKind::Delete => self.deleted += 1,
                MutationKind::Update => self.updated += 1,
                MutationKind::Create => self.created += 1,
            },
            Err(err) => {
                log::warn!("Failed to {} variable '{}': {}", kind, mutation.key(), err);
                self.errors.push(SaveFailure {
                    kind,
                    key: mutation.key().to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Ordered remote steps that bring the server in line with the table:
/// deletions, then updates, then creations.
///
/// Deletions free keys before renamed or new rows claim them.
pub fn plan_mutations(table: &EnvVarTable) -> Vec<Mutation> {
    let rows = table.rows();
    let deletes = rows.iter().filter_map(|row| match row.status() {
        RowStatus::Deleted { .. } => Some(Mutation::Delete {
            key: row.original_key().to_string(),
            environment_scope: row.variable().environment_scope.clone(),
        }),
        _ => None,
    });
    let updates = rows.iter().filter_map(|row| match row.status() {
        RowStatus::Edited { .. } => Some(update_for(row)),
        _ => None,
    });
    let creates = rows.iter().filter_map(|row| match row.status() {
        RowStatus::New => Some(Mutation::Create {
            variable: row.variable().clone(),
        }),
        _ => None,
    });

    deletes.chain(updates).chain(creates).collect()
}

fn update_for(row: &EnvVarRow) -> Mutation {
    if row.is_renamed() || row.masked_on_server() {
        Mutation::Replace {
            old_key: row.original_key().to_string(),
            old_scope: row.remote_scope().to_string(),
            variable: row.variable().clone(),
        }
    } else {
        Mutation::Update {
            variable: row.variable().clone(),
        }
    }
}

pub fn reconcile<G>(
    table: &EnvVarTable,
    gateway: &G,
    scope: &ProjectScope,
) -> Result<SaveResult, AppError>
where
    G: VariableGateway + ?Sized,
{
    reconcile_with_progress(table, gateway, scope, |_, _, _| {})
}

/// Run every planned mutation in order, one at a time.
///
/// Per-item failures are collected into the result and never stop the batch.
/// Only an incomplete `scope` aborts, before anything is sent. Row statuses
/// are left alone; reload from the server afterwards.
pub fn reconcile_with_progress<G, F>(
    table: &EnvVarTable,
    gateway: &G,
    scope: &ProjectScope,
    mut on_step: F,
) -> Result<SaveResult, AppError>
where
    G: VariableGateway + ?Sized,
    F: FnMut(usize, usize, &Mutation),
{
    scope.ensure_complete()?;

    let mutations = plan_mutations(table);
    let total = mutations.len();
    let mut result = SaveResult::default();

    for (index, mutation) in mutations.iter().enumerate() {
        on_step(index, total, mutation);
        let outcome = apply_mutation(gateway, scope, mutation);
        result.record(mutation, outcome);
    }

    log::info!(
        "Saved variables for {}: {} created, {} updated, {} deleted, {} failed",
        scope,
        result.created,
        result.updated,
        result.deleted,
        result.errors.len()
    );
    Ok(result)
}

fn apply_mutation<G>(gateway: &G, scope: &ProjectScope, mutation: &Mutation) -> Result<(), AppError>
where
    G: VariableGateway + ?Sized,
{
    match mutation {
        Mutation::Delete {
            key,
            environment_scope,
        } => {
            log::debug!("DELETE {key} ({environment_scope})");
            gateway.delete_variable(scope, key, environment_scope)
        }
        Mutation::Update { variable } => {
            log::debug!("UPDATE {} ({})", variable.key, variable.environment_scope);
            gateway.update_variable(scope, variable)
        }
        Mutation::Replace {
            old_key,
            old_scope,
            variable,
        } => {
            log::debug!(
                "REPLACE {old_key} ({old_scope}) -> {} ({})",
                variable.key,
                variable.environment_scope
            );
            gateway.delete_variable(scope, old_key, old_scope)?;
            gateway.create_variable(scope, variable)
        }
        Mutation::Create { variable } => {
            log::debug!("CREATE {} ({})", variable.key, variable.environment_scope);
            gateway.create_variable(scope, variable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_vars::row::RowEdit;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl VariableGateway for Recorder {
        fn list_variables(&self, _scope: &ProjectScope) -> Result<Vec<Variable>, AppError> {
            Ok(Vec::new())
        }

        fn create_variable(&self, _scope: &ProjectScope, v: &Variable) -> Result<(), AppError> {
            self.calls.borrow_mut().push(format!("create {}", v.key));
            Ok(())
        }

        fn update_variable(&self, _scope: &ProjectScope, v: &Variable) -> Result<(), AppError> {
            self.calls.borrow_mut().push(format!("update {}", v.key));
            Ok(())
        }

        fn delete_variable(
            &self,
            _scope: &ProjectScope,
            key: &str,
            environment_scope: &str,
        ) -> Result<(), AppError> {
            self.calls
                .borrow_mut()
                .push(format!("delete {key} {environment_scope}"));
            Ok(())
        }
    }

    fn scope() -> ProjectScope {
        ProjectScope::new("inst", "42")
    }

    #[test]
    fn plan_orders_delete_update_create() {
        let mut table = EnvVarTable::from_remote(vec![
            Variable::new("KEEP", "1"),
            Variable::new("EDIT", "1"),
            Variable::new("DROP", "1"),
        ]);
        table.add_new(Variable::new("ADD", "1"));
        let edit = table.rows()[1].id();
        let drop = table.rows()[2].id();
        table
            .update_field(edit, RowEdit::Value("2".into()))
            .expect("row exists");
        table.mark_deleted(drop).expect("row exists");

        let plan = plan_mutations(&table);
        let kinds: Vec<(MutationKind, &str)> = plan.iter().map(|m| (m.kind(), m.key())).collect();
        assert_eq!(
            kinds,
            vec![
                (MutationKind::Delete, "DROP"),
                (MutationKind::Update, "EDIT"),
                (MutationKind::Create, "ADD"),
            ]
        );
    }

    #[test]
    fn rename_becomes_delete_then_create() {
        let mut table = EnvVarTable::from_remote(vec![Variable::new("OLD", "v")]);
        let id = table.rows()[0].id();
        table
            .update_field(id, RowEdit::Key("NEW".into()))
            .expect("row exists");

        let gateway = Recorder::default();
        let result = reconcile(&table, &gateway, &scope()).expect("scope is complete");

        assert_eq!(
            gateway.calls.borrow().as_slice(),
            &["delete OLD *".to_string(), "create NEW".to_string()]
        );
        assert_eq!(result.updated, 1);
        assert!(result.is_success());
    }

    #[test]
    fn incomplete_scope_aborts_before_any_call() {
        let mut table = EnvVarTable::new();
        table.add_new(Variable::new("A", "1"));
        let gateway = Recorder::default();

        let err = reconcile(&table, &gateway, &ProjectScope::new("inst", " "))
            .expect_err("blank project id");
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(gateway.calls.borrow().is_empty());
    }

    #[test]
    fn untouched_table_plans_nothing() {
        let table = EnvVarTable::from_remote(vec![Variable::new("A", "1"), Variable::new("B", "2")]);
        assert!(plan_mutations(&table).is_empty());
    }
}
