use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::env_vars::ImportPreset;
use crate::error::AppError;

/// GitLab rejects masked values shorter than this.
pub const DEFAULT_MASKED_MIN_LENGTH: usize = 8;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application settings stored in `settings.json` next to the config store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Minimum value length accepted for masked variables
    #[serde(default = "default_masked_min_length")]
    pub masked_min_length: usize,
    /// Preset applied to rows created by `vars import` when none is given
    #[serde(default)]
    pub default_import_preset: ImportPreset,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_masked_min_length() -> usize {
    DEFAULT_MASKED_MIN_LENGTH
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            masked_min_length: DEFAULT_MASKED_MIN_LENGTH,
            default_import_preset: ImportPreset::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AppSettings {
    fn settings_path() -> PathBuf {
        crate::config::get_app_settings_path()
    }

    fn normalize(&mut self) {
        if self.masked_min_length == 0 {
            self.masked_min_length = DEFAULT_MASKED_MIN_LENGTH;
        }
        self.request_timeout_secs = self.request_timeout_secs.max(1);
    }

    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<AppSettings>(&content) {
                Ok(mut settings) => {
                    settings.normalize();
                    settings
                }
                Err(err) => {
                    log::warn!(
                        "Failed to parse settings, falling back to defaults. Path: {}, error: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let mut normalized = self.clone();
        normalized.normalize();
        crate::config::write_json_file(path, &normalized)
    }
}
