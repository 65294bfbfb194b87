use clap::Parser;
use gitlab_vars_lib::cli::{Cli, Commands};
use gitlab_vars_lib::AppError;
use std::process;

fn main() {
    let cli = Cli::parse();

    // Keep command output clean unless asked for more.
    let log_level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Instance(cmd) => gitlab_vars_lib::cli::commands::instance::execute(cmd),
        Commands::Project(cmd) => gitlab_vars_lib::cli::commands::project::execute(cmd),
        Commands::Vars(cmd) => gitlab_vars_lib::cli::commands::vars::execute(cmd),
        Commands::Package(cmd) => gitlab_vars_lib::cli::commands::package::execute(cmd),
        Commands::Completions { shell } => {
            gitlab_vars_lib::cli::generate_completions(shell);
            Ok(())
        }
    }
}
