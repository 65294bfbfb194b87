// Core modules
mod config;
mod env_vars;
mod error;
mod gateway;
mod gitlab;
mod models;
mod services;
mod settings;
mod store;

// CLI module
pub mod cli;

// Public exports
pub use config::{get_app_config_dir, get_app_config_path, read_json_file, CONFIG_DIR_ENV};
pub use env_vars::{
    merge_parsed, parse_env_from_clipboard, parse_env_from_paste, parse_env_text,
    plan_mutations, reconcile, reconcile_with_progress, validate, DeleteOutcome, EnvVarRow,
    EnvVarTable, ImportPreset, MergeSummary, Mutation, MutationKind, ParsedEnvVar,
    PendingChanges, RowEdit, RowError, RowId, RowStatus, SaveFailure, SaveResult,
    ValidationRules,
};
pub use error::AppError;
pub use gateway::{ProjectScope, VariableGateway};
pub use gitlab::GitLabClient;
pub use models::{
    GitLabInstance, GitLabProject, PackageUploadParams, RemoteProject, Variable, VariableType,
};
pub use services::{
    EnvVarSession, InstanceService, NewInstance, PackageService, ProjectService, SaveReport,
};
pub use settings::AppSettings;
pub use store::ConfigStore;
