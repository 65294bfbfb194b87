use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::{read_json_file, write_json_file};
use crate::error::AppError;

pub const INSTANCES_KEY: &str = "instances";
pub const PROJECTS_KEY: &str = "projects";

/// Handle over the persisted `config.json` document.
///
/// Opened once at startup and handed to whatever needs it; nothing here is
/// global. Mutations stay in memory until [`ConfigStore::save`].
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    data: Map<String, Value>,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let mut data = if path.exists() {
            match read_json_file::<Value>(&path)? {
                Value::Object(map) => map,
                _ => {
                    return Err(AppError::Config(format!(
                        "{} must contain a JSON object",
                        path.display()
                    )))
                }
            }
        } else {
            log::debug!("Config store {} not found, starting empty", path.display());
            Map::new()
        };

        for key in [INSTANCES_KEY, PROJECTS_KEY] {
            data.entry(key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
        }

        Ok(Self { path, data })
    }

    pub fn open_default() -> Result<Self, AppError> {
        Self::open(crate::config::get_app_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing keys read as `None`; present but malformed values are an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| AppError::json(&self.path, e)),
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value).map_err(|e| AppError::JsonSerialize { source: e })?;
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    pub fn save(&self) -> Result<(), AppError> {
        write_json_file(&self.path, &self.data)?;
        log::debug!("Saved config store to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GitLabInstance;
    use tempfile::TempDir;

    #[test]
    fn open_missing_file_seeds_empty_arrays() {
        let dir = TempDir::new().expect("create temp dir");
        let store = ConfigStore::open(dir.path().join("config.json")).expect("open store");

        let instances: Vec<GitLabInstance> = store
            .get(INSTANCES_KEY)
            .expect("read instances")
            .expect("instances present");
        assert!(instances.is_empty());
        assert!(!store.path().exists(), "opening must not write the file");
    }

    #[test]
    fn set_and_save_persists_values() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.json");

        let mut store = ConfigStore::open(&path).expect("open store");
        let instance = GitLabInstance {
            id: "inst-1".to_string(),
            name: "Work".to_string(),
            url: "https://gitlab.example.com".to_string(),
            username: "ci".to_string(),
            token: "glpat-secret".to_string(),
        };
        store
            .set(INSTANCES_KEY, &vec![instance.clone()])
            .expect("set instances");
        store.save().expect("save store");

        let reopened = ConfigStore::open(&path).expect("reopen store");
        let loaded: Vec<GitLabInstance> = reopened
            .get(INSTANCES_KEY)
            .expect("read instances")
            .unwrap_or_default();
        assert_eq!(loaded, vec![instance]);
    }

    #[test]
    fn open_rejects_non_object_document() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2, 3]").expect("seed file");

        let err = ConfigStore::open(&path).expect_err("array document is invalid");
        assert!(matches!(err, AppError::Config(_)));
    }
}
