use crate::error::AppError;
use crate::gateway::ProjectScope;
use crate::models::GitLabProject;
use crate::store::{ConfigStore, PROJECTS_KEY};

use super::instance::{unique_id, InstanceService};

/// Projects registered under instances.
pub struct ProjectService;

impl ProjectService {
    pub fn list(
        store: &ConfigStore,
        instance_id: Option<&str>,
    ) -> Result<Vec<GitLabProject>, AppError> {
        let projects: Vec<GitLabProject> = store.get(PROJECTS_KEY)?.unwrap_or_default();
        Ok(match instance_id {
            Some(instance_id) => projects
                .into_iter()
                .filter(|p| p.instance_id == instance_id)
                .collect(),
            None => projects,
        })
    }

    /// Look up by local id first, then by case-insensitive name.
    pub fn resolve(store: &ConfigStore, id_or_name: &str) -> Result<GitLabProject, AppError> {
        let projects = Self::list(store, None)?;
        if let Some(project) = projects.iter().find(|p| p.id == id_or_name) {
            return Ok(project.clone());
        }

        let mut by_name = projects
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(id_or_name));
        match (by_name.next(), by_name.next()) {
            (Some(project), None) => Ok(project.clone()),
            (Some(_), Some(_)) => Err(AppError::InvalidInput(format!(
                "Project name '{id_or_name}' is ambiguous, use its id"
            ))),
            (None, _) => Err(AppError::NotFound(format!("Project '{id_or_name}'"))),
        }
    }

    pub fn add(
        store: &mut ConfigStore,
        instance_id: &str,
        project_id: &str,
        name: Option<&str>,
    ) -> Result<GitLabProject, AppError> {
        let instance = InstanceService::resolve(store, instance_id)?;
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(AppError::InvalidInput("Project id is required".to_string()));
        }

        let mut projects = Self::list(store, None)?;
        if projects
            .iter()
            .any(|p| p.instance_id == instance.id && p.project_id == project_id)
        {
            return Err(AppError::InvalidInput(format!(
                "Project {project_id} is already registered on {}",
                instance.name
            )));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(project_id)
            .to_string();
        let id = unique_id(&name, projects.iter().map(|p| p.id.as_str()));
        let project = GitLabProject {
            id,
            instance_id: instance.id,
            project_id: project_id.to_string(),
            name,
        };
        projects.push(project.clone());
        store.set(PROJECTS_KEY, &projects)?;
        store.save()?;
        Ok(project)
    }

    pub fn remove(store: &mut ConfigStore, id: &str) -> Result<GitLabProject, AppError> {
        let mut projects = Self::list(store, None)?;
        let index = projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Project '{id}'")))?;
        let removed = projects.remove(index);
        store.set(PROJECTS_KEY, &projects)?;
        store.save()?;
        Ok(removed)
    }

    pub fn scope(project: &GitLabProject) -> ProjectScope {
        ProjectScope::new(project.instance_id.clone(), project.project_id.clone())
    }
}
