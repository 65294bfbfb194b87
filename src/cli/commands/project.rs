use clap::Subcommand;

use crate::cli::ui::{create_table, highlight, info, success};
use crate::error::AppError;
use crate::services::{InstanceService, ProjectService};

use super::{confirm, open_state};

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// List registered projects
    List {
        /// Only show projects of this instance
        #[arg(long)]
        instance: Option<String>,
    },
    /// Register a project
    Add {
        /// Instance ID or name
        instance: String,
        /// GitLab project ID or full path (group/project)
        project_id: String,
        /// Local display name (defaults to the project ID)
        #[arg(long)]
        name: Option<String>,
    },
    /// Unregister a project
    Remove {
        /// Project ID or name
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Search projects you are a member of
    Search {
        /// Instance ID or name
        instance: String,
        /// Search text
        query: Option<String>,
    },
}

pub fn execute(cmd: ProjectCommand) -> Result<(), AppError> {
    match cmd {
        ProjectCommand::List { instance } => list_projects(instance.as_deref()),
        ProjectCommand::Add {
            instance,
            project_id,
            name,
        } => add_project(&instance, &project_id, name.as_deref()),
        ProjectCommand::Remove { id, yes } => remove_project(&id, yes),
        ProjectCommand::Search { instance, query } => search_projects(&instance, query.as_deref()),
    }
}

fn list_projects(instance: Option<&str>) -> Result<(), AppError> {
    let (store, _) = open_state()?;
    let instance_id = match instance {
        Some(raw) => Some(InstanceService::resolve(&store, raw)?.id),
        None => None,
    };
    let projects = ProjectService::list(&store, instance_id.as_deref())?;

    if projects.is_empty() {
        println!("{}", info("No projects registered."));
        println!("Use 'gitlab-vars project add <instance> <project-id>' to register one.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "Instance", "GitLab project"]);
    for project in projects {
        table.add_row(vec![
            project.id,
            project.name,
            project.instance_id,
            project.project_id,
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn add_project(instance: &str, project_id: &str, name: Option<&str>) -> Result<(), AppError> {
    let (mut store, _) = open_state()?;
    let project = ProjectService::add(&mut store, instance, project_id, name)?;
    println!(
        "{}",
        success(&format!("✓ Project '{}' registered", project.name))
    );
    println!("ID: {}", highlight(&project.id));
    Ok(())
}

fn remove_project(id_or_name: &str, yes: bool) -> Result<(), AppError> {
    let (mut store, _) = open_state()?;
    let project = ProjectService::resolve(&store, id_or_name)?;

    if !yes && !confirm(&format!("Unregister project '{}'?", project.name))? {
        println!("{}", info("Cancelled."));
        return Ok(());
    }

    ProjectService::remove(&mut store, &project.id)?;
    println!(
        "{}",
        success(&format!("✓ Project '{}' removed", project.name))
    );
    Ok(())
}

fn search_projects(instance: &str, query: Option<&str>) -> Result<(), AppError> {
    let (store, settings) = open_state()?;
    let client = InstanceService::client(&store, instance, &settings)?;
    let results = client.search_projects(query)?;

    if results.is_empty() {
        println!("{}", info("No matching projects."));
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Project ID", "Name", "Path"]);
    for project in results {
        table.add_row(vec![
            project.id.to_string(),
            project.name_with_namespace,
            project.path_with_namespace,
        ]);
    }
    println!("{}", table);
    println!(
        "\n{} Register one with 'gitlab-vars project add {} <project-id>'",
        info("→"),
        client.instance().id
    );
    Ok(())
}
