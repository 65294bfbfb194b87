use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_ENVIRONMENT_SCOPE: &str = "*";

/// A registered GitLab instance and the token used to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabInstance {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub username: String,
    pub token: String,
}

/// A project registered under an instance. `id` is local, `project_id` is what
/// GitLab knows it by (numeric id or `group/path`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitLabProject {
    pub id: String,
    pub instance_id: String,
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    EnvVar,
    File,
}

impl VariableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::EnvVar => "env_var",
            VariableType::File => "file",
        }
    }
}

/// A CI/CD variable as the remote side stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variable_type: VariableType,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub masked: bool,
    #[serde(default = "default_scope", deserialize_with = "null_as_scope")]
    pub environment_scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            variable_type: VariableType::EnvVar,
            protected: false,
            masked: false,
            environment_scope: default_scope(),
            description: None,
        }
    }
}

fn default_scope() -> String {
    DEFAULT_ENVIRONMENT_SCOPE.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_scope<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_scope))
}

/// A project as returned by the instance's project search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: u64,
    #[serde(default)]
    pub name_with_namespace: String,
    #[serde(default)]
    pub path_with_namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageUploadParams {
    pub package_name: String,
    pub package_version: String,
    pub file_name: String,
    pub file_path: String,
}
