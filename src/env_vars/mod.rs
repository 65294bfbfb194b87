//! Local editing model for a project's CI/CD variables and the engine that
//! pushes those edits back to the server.

mod merge;
mod parser;
mod reconcile;
mod row;
mod table;
mod validate;

pub use merge::{merge_parsed, ImportPreset, MergeSummary};
pub use parser::{parse_env_from_clipboard, parse_env_from_paste, parse_env_text, ParsedEnvVar};
pub use reconcile::{
    plan_mutations, reconcile, reconcile_with_progress, Mutation, MutationKind, SaveFailure,
    SaveResult,
};
pub use row::{DeleteOutcome, EnvVarRow, RowEdit, RowError, RowId, RowStatus};
pub use table::{EnvVarTable, PendingChanges};
pub use validate::{validate, ValidationRules};
