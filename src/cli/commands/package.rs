use clap::Subcommand;
use std::path::PathBuf;

use crate::cli::ui::{info, success};
use crate::error::AppError;
use crate::services::{PackageService, ProjectService};

use super::open_state;

#[derive(Subcommand)]
pub enum PackageCommand {
    /// Upload a file to the project's generic package registry
    Upload {
        /// Project ID or name
        project: String,
        /// Package name
        #[arg(long)]
        name: String,
        /// Package version
        #[arg(long)]
        version: String,
        /// File to upload
        #[arg(long)]
        file: PathBuf,
    },
}

pub fn execute(cmd: PackageCommand) -> Result<(), AppError> {
    match cmd {
        PackageCommand::Upload {
            project,
            name,
            version,
            file,
        } => {
            let (store, settings) = open_state()?;
            let project = ProjectService::resolve(&store, &project)?;
            println!(
                "{}",
                info(&format!("Uploading {} to {}...", file.display(), project.name))
            );
            let url = PackageService::upload(&store, &settings, &project, &name, &version, &file)?;
            println!("{}", success(&format!("✓ Uploaded to {}", url)));
            Ok(())
        }
    }
}
