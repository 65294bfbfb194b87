pub mod env_vars;
pub mod instance;
pub mod package;
pub mod project;

pub use env_vars::{EnvVarSession, SaveReport};
pub use instance::{InstanceService, NewInstance};
pub use package::PackageService;
pub use project::ProjectService;
