use clap::Subcommand;

use crate::cli::ui::{create_table, highlight, info, success};
use crate::error::AppError;
use crate::services::{InstanceService, NewInstance, ProjectService};

use super::{confirm, open_state};

#[derive(Subcommand)]
pub enum InstanceCommand {
    /// List registered instances
    List,
    /// Register a GitLab instance
    Add {
        /// Display name
        name: String,
        /// Base URL, e.g. https://gitlab.com
        url: String,
        /// Personal or project access token (prompted when omitted)
        #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Username, informational only
        #[arg(long, default_value = "")]
        username: String,
    },
    /// Remove an instance and its projects
    Remove {
        /// Instance ID or name
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn execute(cmd: InstanceCommand) -> Result<(), AppError> {
    match cmd {
        InstanceCommand::List => list_instances(),
        InstanceCommand::Add {
            name,
            url,
            token,
            username,
        } => add_instance(name, url, token, username),
        InstanceCommand::Remove { id, yes } => remove_instance(&id, yes),
    }
}

fn list_instances() -> Result<(), AppError> {
    let (store, _) = open_state()?;
    let instances = InstanceService::list(&store)?;

    if instances.is_empty() {
        println!("{}", info("No instances registered."));
        println!("Use 'gitlab-vars instance add <name> <url>' to register one.");
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Name", "URL", "Username", "Projects"]);
    for instance in instances {
        let projects = ProjectService::list(&store, Some(&instance.id))?.len();
        table.add_row(vec![
            instance.id,
            instance.name,
            instance.url,
            instance.username,
            projects.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn add_instance(
    name: String,
    url: String,
    token: Option<String>,
    username: String,
) -> Result<(), AppError> {
    let token = match token {
        Some(token) => token,
        None => inquire::Password::new("Access token:")
            .without_confirmation()
            .prompt()
            .map_err(|e| AppError::Message(format!("Prompt failed: {}", e)))?,
    };

    let (mut store, _) = open_state()?;
    let instance = InstanceService::add(
        &mut store,
        NewInstance {
            name,
            url,
            username,
            token,
        },
    )?;

    println!(
        "{}",
        success(&format!("✓ Instance '{}' registered", instance.name))
    );
    println!("ID: {}", highlight(&instance.id));
    Ok(())
}

fn remove_instance(id_or_name: &str, yes: bool) -> Result<(), AppError> {
    let (mut store, _) = open_state()?;
    let instance = InstanceService::resolve(&store, id_or_name)?;
    let projects = ProjectService::list(&store, Some(&instance.id))?.len();

    if !yes {
        let prompt = format!(
            "Remove instance '{}' and {} registered project(s)?",
            instance.name, projects
        );
        if !confirm(&prompt)? {
            println!("{}", info("Cancelled."));
            return Ok(());
        }
    }

    InstanceService::remove(&mut store, &instance.id)?;
    println!(
        "{}",
        success(&format!("✓ Instance '{}' removed", instance.name))
    );
    Ok(())
}
