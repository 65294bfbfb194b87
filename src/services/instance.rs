use url::Url;

use crate::error::AppError;
use crate::gitlab::GitLabClient;
use crate::models::{GitLabInstance, GitLabProject};
use crate::settings::AppSettings;
use crate::store::{ConfigStore, INSTANCES_KEY, PROJECTS_KEY};

/// Fields for registering an instance.
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub name: String,
    pub url: String,
    pub username: String,
    pub token: String,
}

/// Registered GitLab instances.
pub struct InstanceService;

impl InstanceService {
    pub fn list(store: &ConfigStore) -> Result<Vec<GitLabInstance>, AppError> {
        Ok(store.get(INSTANCES_KEY)?.unwrap_or_default())
    }

    /// Look up by id first, then by case-insensitive name.
    pub fn resolve(store: &ConfigStore, id_or_name: &str) -> Result<GitLabInstance, AppError> {
        let instances = Self::list(store)?;
        instances
            .iter()
            .find(|i| i.id == id_or_name)
            .or_else(|| {
                instances
                    .iter()
                    .find(|i| i.name.eq_ignore_ascii_case(id_or_name))
            })
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Instance '{id_or_name}'")))
    }

    pub fn add(store: &mut ConfigStore, new: NewInstance) -> Result<GitLabInstance, AppError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Instance name is required".to_string()));
        }
        let url = normalize_url(&new.url)?;
        let token = new.token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::InvalidInput("Access token is required".to_string()));
        }

        let mut instances = Self::list(store)?;
        let id = unique_id(&name, instances.iter().map(|i| i.id.as_str()));
        let instance = GitLabInstance {
            id,
            name,
            url,
            username: new.username.trim().to_string(),
            token,
        };
        instances.push(instance.clone());
        store.set(INSTANCES_KEY, &instances)?;
        store.save()?;

        log::info!("Registered instance {} ({})", instance.id, instance.url);
        Ok(instance)
    }

    /// Removes the instance together with every project registered under it.
    pub fn remove(store: &mut ConfigStore, id: &str) -> Result<GitLabInstance, AppError> {
        let mut instances = Self::list(store)?;
        let index = instances
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Instance '{id}'")))?;
        let removed = instances.remove(index);

        let mut projects: Vec<GitLabProject> = store.get(PROJECTS_KEY)?.unwrap_or_default();
        let before = projects.len();
        projects.retain(|p| p.instance_id != removed.id);
        if projects.len() != before {
            log::info!(
                "Dropping {} project(s) registered under {}",
                before - projects.len(),
                removed.id
            );
        }

        store.set(INSTANCES_KEY, &instances)?;
        store.set(PROJECTS_KEY, &projects)?;
        store.save()?;
        Ok(removed)
    }

    pub fn client(
        store: &ConfigStore,
        instance_id: &str,
        settings: &AppSettings,
    ) -> Result<GitLabClient, AppError> {
        let instance = Self::resolve(store, instance_id)?;
        GitLabClient::new(instance, settings.request_timeout_secs)
    }
}

fn normalize_url(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| AppError::InvalidInput(format!("'{trimmed}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::InvalidInput(format!(
            "Instance URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(trimmed.to_string())
}

/// Slug of `name`, suffixed with a counter when already taken.
pub(crate) fn unique_id<'a>(name: &str, taken: impl Iterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = taken.collect();
    let mut base: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if base.is_empty() {
        base = "item".to_string();
    }

    if !taken.contains(&base.as_str()) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or(base)
}
