use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Overrides the config directory; mostly useful for tests and portable setups.
pub const CONFIG_DIR_ENV: &str = "GITLAB_VARS_CONFIG_DIR";

pub fn get_app_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gitlab-vars")
}

/// Instances and projects live here.
pub fn get_app_config_path() -> PathBuf {
    get_app_config_dir().join("config.json")
}

pub fn get_app_settings_path() -> PathBuf {
    get_app_config_dir().join("settings.json")
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| AppError::json(path, e))
}

pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| AppError::JsonSerialize { source: e })?;
    atomic_write(path, json.as_bytes())
}

/// Write to a sibling temp file and rename over the target.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::Config(format!("Invalid path: {}", path.display())))?;
    fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| AppError::IoContext {
        context: format!("Failed to create temp file in {}", parent.display()),
        source: e,
    })?;
    tmp.write_all(data).map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| AppError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| AppError::io(path, e.error))?;
    Ok(())
}
