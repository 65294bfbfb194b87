use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use url::Url;

use crate::error::AppError;
use crate::gateway::{ProjectScope, VariableGateway};
use crate::models::{
    GitLabInstance, PackageUploadParams, RemoteProject, Variable, DEFAULT_ENVIRONMENT_SCOPE,
};

const PER_PAGE: &str = "100";
const MAX_PAGES: u32 = 50;

/// REST v4 client bound to one registered instance.
pub struct GitLabClient {
    client: Client,
    instance: GitLabInstance,
}

impl GitLabClient {
    pub fn new(instance: GitLabInstance, timeout_secs: u64) -> Result<Self, AppError> {
        let token = instance.token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Instance '{}' has no access token",
                instance.name
            )));
        }

        let mut headers = HeaderMap::new();
        let mut private_token = HeaderValue::from_str(token)
            .map_err(|_| AppError::InvalidInput("Invalid token format".to_string()))?;
        private_token.set_sensitive(true);
        headers.insert("PRIVATE-TOKEN", private_token);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AppError::InvalidInput("Invalid bearer token format".to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, instance })
    }

    pub fn instance(&self) -> &GitLabInstance {
        &self.instance
    }

    pub fn search_projects(&self, query: Option<&str>) -> Result<Vec<RemoteProject>, AppError> {
        let mut url = self.api_url(&["projects"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("membership", "true");
            pairs.append_pair("simple", "true");
            if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
                pairs.append_pair("search", q);
            }
        }

        let client = self.client.clone();
        run_http(async move {
            let resp = send(client.get(url), "search projects").await?;
            resp.json::<Vec<RemoteProject>>()
                .await
                .map_err(|e| AppError::Http(format!("Invalid project list: {e}")))
        })
    }

    pub fn upload_package(
        &self,
        project_id: &str,
        params: &PackageUploadParams,
    ) -> Result<String, AppError> {
        let url = self.api_url(&[
            "projects",
            project_id,
            "packages",
            "generic",
            &params.package_name,
            &params.package_version,
            &params.file_name,
        ])?;
        let path = Path::new(&params.file_path);
        let body = fs::read(path).map_err(|e| AppError::io(path, e))?;
        log::debug!("Uploading {} bytes to {}", body.len(), url);

        let client = self.client.clone();
        let target = url.to_string();
        run_http(async move {
            send(client.put(url).body(body), "upload package").await?;
            Ok(target)
        })
    }

    fn base_url(&self) -> String {
        self.instance.url.trim().trim_end_matches('/').to_string()
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, AppError> {
        let base = self.base_url();
        let mut url = Url::parse(&base).map_err(|e| {
            AppError::InvalidInput(format!("Instance URL '{base}' is not valid: {e}"))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::InvalidInput(format!("Instance URL '{base}' cannot be a base"))
            })?;
            path.pop_if_empty();
            path.push("api");
            path.push("v4");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn variable_url(
        &self,
        project_id: &str,
        key: &str,
        environment_scope: &str,
    ) -> Result<Url, AppError> {
        let mut url = self.api_url(&["projects", project_id, "variables", key])?;
        if environment_scope != DEFAULT_ENVIRONMENT_SCOPE {
            url.query_pairs_mut()
                .append_pair("filter[environment_scope]", environment_scope);
        }
        Ok(url)
    }

    fn check_scope(&self, scope: &ProjectScope) -> Result<(), AppError> {
        if scope.instance_id != self.instance.id {
            return Err(AppError::InvalidInput(format!(
                "Client for instance '{}' cannot serve '{}'",
                self.instance.id, scope.instance_id
            )));
        }
        Ok(())
    }
}

fn variable_body(variable: &Variable) -> serde_json::Value {
    let mut body = json!({
        "key": variable.key,
        "value": variable.value,
        "variable_type": variable.variable_type,
        "protected": variable.protected,
        "masked": variable.masked,
        "environment_scope": variable.environment_scope,
    });
    if let Some(description) = &variable.description {
        body["description"] = json!(description);
    }
    body
}

impl VariableGateway for GitLabClient {
    fn list_variables(&self, scope: &ProjectScope) -> Result<Vec<Variable>, AppError> {
        self.check_scope(scope)?;
        let base = self.api_url(&["projects", &scope.project_id, "variables"])?;
        let client = self.client.clone();

        run_http(async move {
            let mut variables = Vec::new();
            let mut page = 1u32;
            loop {
                let mut url = base.clone();
                url.query_pairs_mut()
                    .append_pair("per_page", PER_PAGE)
                    .append_pair("page", &page.to_string());

                let resp = send(client.get(url), "list variables").await?;
                let next_page = resp
                    .headers()
                    .get("x-next-page")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u32>().ok());
                let batch = resp
                    .json::<Vec<Variable>>()
                    .await
                    .map_err(|e| AppError::Http(format!("Invalid variable list: {e}")))?;
                variables.extend(batch);

                match next_page {
                    Some(next) if next > page && next <= MAX_PAGES => page = next,
                    _ => break,
                }
            }
            Ok(variables)
        })
    }

    fn create_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        self.check_scope(scope)?;
        let url = self.api_url(&["projects", &scope.project_id, "variables"])?;
        let body = variable_body(variable);
        let client = self.client.clone();
        run_http(async move {
            send(client.post(url).json(&body), "create variable").await?;
            Ok(())
        })
    }

    fn update_variable(&self, scope: &ProjectScope, variable: &Variable) -> Result<(), AppError> {
        self.check_scope(scope)?;
        let url = self.variable_url(&scope.project_id, &variable.key, &variable.environment_scope)?;
        let body = variable_body(variable);
        let client = self.client.clone();
        run_http(async move {
            send(client.put(url).json(&body), "update variable").await?;
            Ok(())
        })
    }

    fn delete_variable(
        &self,
        scope: &ProjectScope,
        key: &str,
        environment_scope: &str,
    ) -> Result<(), AppError> {
        self.check_scope(scope)?;
        let url = self.variable_url(&scope.project_id, key, environment_scope)?;
        let client = self.client.clone();
        run_http(async move {
            send(client.delete(url), "delete variable").await?;
            Ok(())
        })
    }
}

async fn send(request: RequestBuilder, operation: &str) -> Result<Response, AppError> {
    let resp = request
        .send()
        .await
        .map_err(|e| AppError::Http(format!("{operation}: {e}")))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::Remote {
        operation: operation.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn run_http<F, T>(future: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, AppError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::Message(format!("Failed to create async runtime: {e}")))?;
    runtime.block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> GitLabClient {
        GitLabClient::new(
            GitLabInstance {
                id: "inst".to_string(),
                name: "Work".to_string(),
                url: url.to_string(),
                username: String::new(),
                token: " glpat-abc ".to_string(),
            },
            10,
        )
        .expect("build client")
    }

    #[test]
    fn api_url_encodes_namespaced_project_ids() {
        let c = client("https://gitlab.example.com/");
        let url = c
            .api_url(&["projects", "group/sub project", "variables"])
            .expect("build url");
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%20project/variables"
        );
    }

    #[test]
    fn api_url_keeps_instance_path_prefix() {
        let c = client("https://example.com/gitlab");
        let url = c.api_url(&["projects"]).expect("build url");
        assert_eq!(url.as_str(), "https://example.com/gitlab/api/v4/projects");
    }

    #[test]
    fn variable_url_filters_non_default_scope() {
        let c = client("https://gitlab.example.com");
        let any = c.variable_url("42", "TOKEN", "*").expect("build url");
        assert_eq!(
            any.as_str(),
            "https://gitlab.example.com/api/v4/projects/42/variables/TOKEN"
        );

        let scoped = c
            .variable_url("42", "TOKEN", "review/*")
            .expect("build url");
        assert_eq!(
            scoped.as_str(),
            "https://gitlab.example.com/api/v4/projects/42/variables/TOKEN?filter%5Benvironment_scope%5D=review%2F*"
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let err = GitLabClient::new(
            GitLabInstance {
                id: "inst".to_string(),
                name: "Work".to_string(),
                url: "https://gitlab.example.com".to_string(),
                username: String::new(),
                token: "  ".to_string(),
            },
            10,
        )
        .err()
        .expect("token required");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn scope_must_match_instance() {
        let c = client("https://gitlab.example.com");
        let err = c
            .delete_variable(&ProjectScope::new("other", "42"), "A", "*")
            .expect_err("wrong instance");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn body_includes_description_only_when_set() {
        let mut var = Variable::new("A", "1");
        assert!(variable_body(&var).get("description").is_none());
        var.description = Some("why".to_string());
        assert_eq!(variable_body(&var)["description"], json!("why"));
        assert_eq!(variable_body(&var)["variable_type"], json!("env_var"));
    }
}
