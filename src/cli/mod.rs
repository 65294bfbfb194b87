use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod commands;
pub mod ui;

#[derive(Parser)]
#[command(
    name = "gitlab-vars",
    version,
    about = "Manage GitLab CI/CD variables from the command line",
    long_about = "Register GitLab instances and projects, then list, edit, import and sync their CI/CD variables.\n\nEvery change is previewed and confirmed before it is sent."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage GitLab instances (list, add, remove)
    #[command(subcommand)]
    Instance(commands::instance::InstanceCommand),

    /// Manage registered projects (list, add, remove, search)
    #[command(subcommand)]
    Project(commands::project::ProjectCommand),

    /// List and edit CI/CD variables of a project
    #[command(subcommand)]
    Vars(commands::vars::VarsCommand),

    /// Upload files to the generic package registry
    #[command(subcommand)]
    Package(commands::package::PackageCommand),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions
pub fn generate_completions(shell: Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_with_preset() {
        let cli = Cli::try_parse_from([
            "gitlab-vars",
            "vars",
            "import",
            "api",
            "--file",
            ".env",
            "--preset",
            "protected_masked",
            "--yes",
        ])
        .expect("parse import");
        assert!(matches!(cli.command, Commands::Vars(_)));
    }
}
