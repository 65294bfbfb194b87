use std::path::Path;

use crate::error::AppError;
use crate::models::{GitLabProject, PackageUploadParams};
use crate::settings::AppSettings;
use crate::store::ConfigStore;

use super::instance::InstanceService;

/// Generic package registry uploads.
pub struct PackageService;

impl PackageService {
    /// Upload `file` as `name/version`. Returns the URL the file was stored at.
    pub fn upload(
        store: &ConfigStore,
        settings: &AppSettings,
        project: &GitLabProject,
        name: &str,
        version: &str,
        file: &Path,
    ) -> Result<String, AppError> {
        let params = Self::params(name, version, file)?;
        let client = InstanceService::client(store, &project.instance_id, settings)?;
        client.upload_package(&project.project_id, &params)
    }

    pub fn params(name: &str, version: &str, file: &Path) -> Result<PackageUploadParams, AppError> {
        let name = name.trim();
        let version = version.trim();
        if name.is_empty() || version.is_empty() {
            return Err(AppError::InvalidInput(
                "Package name and version are required".to_string(),
            ));
        }
        if !file.is_file() {
            return Err(AppError::NotFound(format!("File '{}'", file.display())));
        }
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::InvalidInput(format!("Bad file name: {}", file.display())))?;

        Ok(PackageUploadParams {
            package_name: name.to_string(),
            package_version: version.to_string(),
            file_name: file_name.to_string(),
            file_path: file.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn params_take_file_name_from_path() {
        let dir = TempDir::new().expect("create temp dir");
        let file = dir.path().join("app-1.2.0.tar.gz");
        std::fs::write(&file, b"bytes").expect("seed file");

        let params = PackageService::params(" app ", "1.2.0", &file).expect("params");
        assert_eq!(params.package_name, "app");
        assert_eq!(params.file_name, "app-1.2.0.tar.gz");
    }

    #[test]
    fn params_require_existing_file() {
        let dir = TempDir::new().expect("create temp dir");
        let err = PackageService::params("app", "1.0", &dir.path().join("missing.bin"))
            .expect_err("missing file");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
