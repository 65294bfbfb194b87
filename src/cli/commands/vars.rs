use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::ui::{
    create_table, display_value, error, highlight, info, status_label, success, warning,
};
use crate::env_vars::{
    merge_parsed, parse_env_text, plan_mutations, EnvVarTable, ImportPreset, Mutation, RowEdit,
    RowId, RowStatus, ValidationRules,
};
use crate::error::AppError;
use crate::gitlab::GitLabClient;
use crate::models::{GitLabProject, Variable, VariableType};
use crate::services::{EnvVarSession, InstanceService, ProjectService, SaveReport};
use crate::settings::AppSettings;

use super::{confirm, open_state};

#[derive(Subcommand)]
pub enum VarsCommand {
    /// List a project's variables
    List {
        /// Project ID or name
        project: String,
    },
    /// Create a variable or change an existing one
    Set {
        /// Project ID or name
        project: String,
        key: String,
        value: String,
        /// Only expose to protected branches and tags
        #[arg(long)]
        protected: Option<bool>,
        /// Hide the value in job logs
        #[arg(long)]
        masked: Option<bool>,
        /// Environment scope
        #[arg(long)]
        scope: Option<String>,
        /// Store as a file-type variable
        #[arg(long)]
        file_type: bool,
        #[arg(long)]
        description: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a variable (deletes the old key, creates the new one)
    Rename {
        /// Project ID or name
        project: String,
        old: String,
        new: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete variables
    Delete {
        /// Project ID or name
        project: String,
        #[arg(required = true)]
        keys: Vec<String>,
        #[arg(short, long)]
        yes: bool,
    },
    /// Import a dotenv file (or stdin) into a project
    Import {
        /// Project ID or name
        project: String,
        /// File to read; stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Protection for newly created variables
        #[arg(long, value_enum)]
        preset: Option<ImportPreset>,
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn execute(cmd: VarsCommand) -> Result<(), AppError> {
    match cmd {
        VarsCommand::List { project } => list_vars(&project),
        VarsCommand::Set {
            project,
            key,
            value,
            protected,
            masked,
            scope,
            file_type,
            description,
            yes,
        } => {
            let mut edits = vec![RowEdit::Value(value)];
            if let Some(protected) = protected {
                edits.push(RowEdit::Protected(protected));
            }
            if let Some(masked) = masked {
                edits.push(RowEdit::Masked(masked));
            }
            if let Some(scope) = scope {
                edits.push(RowEdit::EnvironmentScope(scope));
            }
            if file_type {
                edits.push(RowEdit::VariableType(VariableType::File));
            }
            if description.is_some() {
                edits.push(RowEdit::Description(description));
            }
            set_var(&project, &key, edits, yes)
        }
        VarsCommand::Rename {
            project,
            old,
            new,
            yes,
        } => rename_var(&project, &old, &new, yes),
        VarsCommand::Delete { project, keys, yes } => delete_vars(&project, &keys, yes),
        VarsCommand::Import {
            project,
            file,
            preset,
            yes,
        } => import_vars(&project, file, preset, yes),
    }
}

fn open_session(project: &str) -> Result<(EnvVarSession<GitLabClient>, GitLabProject), AppError> {
    let (store, settings) = open_state()?;
    let project = ProjectService::resolve(&store, project)?;
    let client = InstanceService::client(&store, &project.instance_id, &settings)?;
    let mut session = EnvVarSession::new(
        client,
        ProjectService::scope(&project),
        ValidationRules::from(&settings),
    );
    session.load()?;
    Ok((session, project))
}

fn live_row(table: &EnvVarTable, key: &str) -> Result<RowId, AppError> {
    table
        .find_live_by_key(key)
        .map(|row| row.id())
        .ok_or_else(|| AppError::NotFound(format!("Variable '{key}'")))
}

fn list_vars(project: &str) -> Result<(), AppError> {
    let (session, project) = open_session(project)?;
    let rows = session.table().rows();

    if rows.is_empty() {
        println!("{}", info(&format!("{} has no variables.", project.name)));
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Key", "Value", "Type", "Protected", "Masked", "Scope"]);
    for row in rows {
        let var = row.variable();
        table.add_row(vec![
            var.key.clone(),
            display_value(&var.value, var.masked),
            var.variable_type.as_str().to_string(),
            yes_no(var.protected),
            yes_no(var.masked),
            var.environment_scope.clone(),
        ]);
    }
    println!("{}", table);
    println!(
        "\n{} {} variable(s) in {}",
        info("ℹ"),
        rows.len(),
        highlight(&project.name)
    );
    Ok(())
}

fn set_var(project: &str, key: &str, edits: Vec<RowEdit>, yes: bool) -> Result<(), AppError> {
    let (mut session, _) = open_session(project)?;
    let table = session.table_mut();
    let existing = table.find_live_by_key(key).map(|row| row.id());
    let id = match existing {
        Some(id) => id,
        None => table.add_new(Variable::new(key, "")),
    };
    for edit in edits {
        table.update_field(id, edit)?;
    }
    confirm_and_save(&mut session, yes)
}

fn rename_var(project: &str, old: &str, new: &str, yes: bool) -> Result<(), AppError> {
    let (mut session, _) = open_session(project)?;
    let table = session.table_mut();
    let id = live_row(table, old)?;
    table.update_field(id, RowEdit::Key(new.to_string()))?;
    confirm_and_save(&mut session, yes)
}

fn delete_vars(project: &str, keys: &[String], yes: bool) -> Result<(), AppError> {
    let (mut session, _) = open_session(project)?;
    let table = session.table_mut();
    for key in keys {
        let id = live_row(table, key)?;
        table.mark_deleted(id)?;
    }
    confirm_and_save(&mut session, yes)
}

fn import_vars(
    project: &str,
    file: Option<PathBuf>,
    preset: Option<ImportPreset>,
    yes: bool,
) -> Result<(), AppError> {
    let text = match &file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| AppError::IoContext {
                    context: "Failed to read stdin".to_string(),
                    source: e,
                })?;
            buf
        }
    };
    let parsed = parse_env_text(&text).ok_or_else(|| {
        AppError::InvalidInput("Input does not look like environment variables".to_string())
    })?;

    let preset = preset.unwrap_or_else(|| AppSettings::load().default_import_preset);
    let (mut session, project) = open_session(project)?;
    let summary = merge_parsed(session.table_mut(), &parsed, preset);
    println!(
        "{}",
        info(&format!(
            "Parsed {} variable(s) for {}: {} new, {} updated",
            parsed.len(),
            project.name,
            summary.imported,
            summary.merged
        ))
    );
    confirm_and_save(&mut session, yes)
}

/// Preview pending changes, ask, push, then print what happened.
fn confirm_and_save(session: &mut EnvVarSession<GitLabClient>, yes: bool) -> Result<(), AppError> {
    let plan = plan_mutations(session.table());
    if plan.is_empty() {
        println!("{}", info("Nothing to save."));
        return Ok(());
    }

    print_pending(session.table());
    for id in session.table().masked_key_conflicts() {
        if let Some(row) = session.table().row(id) {
            println!(
                "{}",
                warning(&format!(
                    "⚠ '{}' already exists as a masked variable; creating it again will fail unless that one is removed",
                    row.key()
                ))
            );
        }
    }

    if !session.validate() {
        let invalid_rows = print_validation_errors(session.table());
        return Err(AppError::Validation { invalid_rows });
    }

    if !yes && !confirm(&format!("Apply {} change(s)?", plan.len()))? {
        println!("{}", info("Cancelled."));
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    let report = session.save_with_progress(|index, total, mutation| {
        spinner.set_message(format!("[{}/{}] {}", index + 1, total, describe(mutation)));
    });
    spinner.finish_and_clear();

    print_report(&report?);
    Ok(())
}

fn print_pending(table: &EnvVarTable) {
    let mut out = create_table();
    out.set_header(vec!["Status", "Key", "Value", "Protected", "Masked", "Scope"]);
    for row in table.rows().iter().filter(|row| !matches!(row.status(), RowStatus::Existing)) {
        let var = row.variable();
        let key = if row.is_renamed() {
            format!("{} → {}", row.original_key(), var.key)
        } else {
            var.key.clone()
        };
        out.add_row(vec![
            status_label(row.status()),
            key,
            display_value(&var.value, var.masked),
            yes_no(var.protected),
            yes_no(var.masked),
            var.environment_scope.clone(),
        ]);
    }
    println!("{}", out);
}

fn print_validation_errors(table: &EnvVarTable) -> usize {
    let mut invalid = 0;
    for row in table.rows().iter().filter(|row| !row.errors().is_empty()) {
        let tags: Vec<&str> = row.errors().iter().map(|e| e.as_str()).collect();
        let key = if row.key().is_empty() { "<empty>" } else { row.key() };
        println!("{}", error(&format!("✗ {}: {}", key, tags.join(", "))));
        invalid += 1;
    }
    invalid
}

fn print_report(report: &SaveReport) {
    let result = &report.result;
    let summary = format!(
        "{} created, {} updated, {} deleted",
        result.created, result.updated, result.deleted
    );
    if result.is_success() {
        println!("{}", success(&format!("✓ {}", summary)));
    } else {
        println!("{}", warning(&format!("⚠ {} ({} failed)", summary, result.errors.len())));
        for failure in &result.errors {
            println!("  {}", error(&failure.to_string()));
        }
    }
    if let Some(err) = &report.reload_error {
        println!(
            "{}",
            warning(&format!("Could not reload variables after saving: {}", err))
        );
    }
}

fn describe(mutation: &Mutation) -> String {
    match mutation {
        Mutation::Delete { key, .. } => format!("Deleting {key}"),
        Mutation::Update { variable } => format!("Updating {}", variable.key),
        Mutation::Replace {
            old_key, variable, ..
        } => format!("Replacing {old_key} with {}", variable.key),
        Mutation::Create { variable } => format!("Creating {}", variable.key),
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}
