use std::sync::Arc;

use octocrab::service::middleware::retry::RetryConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use tracing::{debug, instrument};

use crate::error::ProvisionError;

/// Looks up the account behind a GitHub token.
#[derive(Clone)]
pub struct GitHubClient {
    github: Arc<octocrab::Octocrab>,
    base_url: String,
}

impl GitHubClient {
    /// Build a client that authenticates with `Authorization: token <token>`.
    ///
    /// Requests are sent once; failures are never retried.
    pub fn new(token: &str, base_url: &str) -> Result<Self, ProvisionError> {
        let github = octocrab::OctocrabBuilder::new()
            .base_uri(base_url)
            .map_err(|e| ProvisionError::Client(format!("Invalid GitHub API URL: {}", e)))?
            .add_retry_config(RetryConfig::None)
            .add_header(AUTHORIZATION, format!("token {}", token))
            .add_header(ACCEPT, "application/vnd.github.v3+json".to_string())
            .add_header(
                USER_AGENT,
                concat!("mcp-vercel-repo/", env!("CARGO_PKG_VERSION")).to_string(),
            )
            .build()
            .map_err(|e| ProvisionError::Client(format!("Failed to create GitHub client: {}", e)))?;
        Ok(Self {
            github: Arc::new(github),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Login of the authenticated user, used as the repository namespace.
    #[instrument(skip(self))]
    pub async fn current_login(&self) -> Result<String, ProvisionError> {
        // Read the raw response so non-JSON failures keep their status code.
        let response = self.github._get(format!("{}/user", self.base_url)).await?;
        let status = response.status();
        let body = self.github.body_to_string(response).await?;
        if !status.is_success() {
            return Err(ProvisionError::from_github_response(status.as_u16(), &body));
        }
        let response: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ProvisionError::Client(format!("Invalid JSON from GitHub: {}", e)))?;
        let login = response
            .get("login")
            .and_then(|l| l.as_str())
            .filter(|l| !l.is_empty())
            .ok_or_else(|| {
                ProvisionError::Client("GitHub identity response has no login".to_string())
            })?;
        debug!(login, "Resolved GitHub namespace");
        Ok(login.to_string())
    }
}

/// Validate that a repository or namespace name can be embedded in
/// `<namespace>/<name>` and in request paths.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<(), ProvisionError> {
    if name.is_empty() {
        return Err(ProvisionError::InvalidParam(format!(
            "{} must not be empty",
            field
        )));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\t'] {
        if name.contains(ch) {
            return Err(ProvisionError::InvalidParam(format!(
                "{} contains invalid character {:?}",
                field, ch
            )));
        }
    }
    Ok(())
}

/// URL GitHub serves a repository at.
pub fn repo_html_url(namespace: &str, name: &str) -> String {
    format!("https://github.com/{}/{}", namespace, name)
}
