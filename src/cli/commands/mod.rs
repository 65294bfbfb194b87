pub mod instance;
pub mod package;
pub mod project;
pub mod vars;

use crate::error::AppError;
use crate::settings::AppSettings;
use crate::store::ConfigStore;

pub(crate) fn confirm(message: &str) -> Result<bool, AppError> {
    inquire::Confirm::new(message)
        .with_default(false)
        .prompt()
        .map_err(|e| AppError::Message(format!("Prompt failed: {}", e)))
}

/// Store and settings handles every command starts from.
pub(crate) fn open_state() -> Result<(ConfigStore, AppSettings), AppError> {
    Ok((ConfigStore::open_default()?, AppSettings::load()))
}
