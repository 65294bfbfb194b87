use std::fmt;

use crate::error::AppError;
use crate::models::Variable;

/// Which project on which instance a batch of calls targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScope {
    pub instance_id: String,
    pub project_id: String,
}

impl ProjectScope {
    pub fn new(instance_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            project_id: project_id.into(),
        }
    }

    pub fn ensure_complete(&self) -> Result<(), AppError> {
        if self.instance_id.trim().is_empty() {
            return Err(AppError::InvalidInput("instance id is required".to_string()));
        }
        if self.project_id.trim().is_empty() {
            return Err(AppError::InvalidInput("project id is required".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.instance_id, self.project_id)
    }
}

/// Remote variable store. Every call may fail independently.
pub trait VariableGateway {
    fn list_variables(&self, scope: &ProjectScope) -> Result<Vec<Variable>, AppError>;

    fn create_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError>;

    fn update_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError>;

    fn delete_variable(
        &self,
        scope: &ProjectScope,
        key: &str,
        environment_scope: &str,
    ) -> Result<(), AppError>;
}

impl<G: VariableGateway + ?Sized> VariableGateway for &G {
    fn list_variables(&self, scope: &ProjectScope) -> Result<Vec<Variable>, AppError> {
        (**self).list_variables(scope)
    }

    fn create_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        (**self).create_variable(scope, variable)
    }

    fn update_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        (**self).update_variable(scope, variable)
    }

    fn delete_variable(
        &self,
        scope: &ProjectScope,
        key: &str,
        environment_scope: &str,
    ) -> Result<(), AppError> {
        (**self).delete_variable(scope, key, environment_scope)
    }
}
