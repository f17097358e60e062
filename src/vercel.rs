//! Vercel REST client for the team listing and git integration endpoints.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProvisionError;

/// Client for the Vercel API and the dashboard integration endpoints.
#[derive(Clone)]
pub struct VercelClient {
    http_client: Client,
    api_key: String,
    api_url: String,
    dashboard_url: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CreateRepoBody<'a> {
    pub provider: &'a str,
    pub namespace: &'a str,
    pub name: &'a str,
    pub private: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PushToRepoBody<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub source: &'a str,
    pub repo: String,
    pub branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
struct Team {
    id: String,
}

/// What Vercel reports after creating a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedRepo {
    pub url: Option<String>,
    pub id: Option<String>,
}

/// What Vercel reports after pushing a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushedTemplate {
    pub project_id: Option<String>,
}

impl VercelClient {
    pub fn new(
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        dashboard_url: impl Into<String>,
    ) -> Result<Self, ProvisionError> {
        let http_client = Client::builder()
            .user_agent(concat!("mcp-vercel-repo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            api_url: trim_base(api_url.into()),
            dashboard_url: trim_base(dashboard_url.into()),
        })
    }

    /// Identifier of the first team the key can see, if any.
    #[instrument(skip(self))]
    pub async fn default_team_id(&self) -> Result<Option<String>, ProvisionError> {
        let url = format!("{}/v2/teams", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let body = read_success(response).await?;
        let teams: TeamsResponse = serde_json::from_value(body).map_err(|e| {
            ProvisionError::Client(format!("Unexpected Vercel teams response: {}", e))
        })?;
        let team_id = teams.teams.into_iter().next().map(|t| t.id);
        debug!(team_id = team_id.as_deref().unwrap_or("none"), "Resolved Vercel team");
        Ok(team_id)
    }

    /// Ask Vercel to create a repository on the git provider.
    #[instrument(skip(self, body), fields(namespace = body.namespace, name = body.name))]
    pub async fn create_repo(&self, body: &CreateRepoBody<'_>) -> Result<CreatedRepo, ProvisionError> {
        let url = format!("{}/api/v1/integrations/git-repo", self.dashboard_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let data = read_success(response).await?;
        Ok(CreatedRepo {
            url: data.get("url").and_then(|u| u.as_str()).map(String::from),
            id: data.get("id").and_then(scalar_to_string),
        })
    }

    /// Push a template into an existing repository, scoped to `team_id` when given.
    #[instrument(skip(self, body), fields(repo = %body.repo))]
    pub async fn push_to_repo(
        &self,
        body: &PushToRepoBody<'_>,
        team_id: Option<&str>,
    ) -> Result<PushedTemplate, ProvisionError> {
        let url = format!("{}/api/v2/integrations/push-to-repo", self.dashboard_url);
        let mut request = self.http_client.post(&url).bearer_auth(&self.api_key).json(body);
        if let Some(team_id) = team_id {
            request = request.query(&[("teamId", team_id)]);
        }
        let data = read_success(request.send().await?).await?;
        let project_id = data
            .get("projectId")
            .or_else(|| data.pointer("/project/id"))
            .and_then(scalar_to_string);
        Ok(PushedTemplate { project_id })
    }
}

async fn read_success(response: reqwest::Response) -> Result<serde_json::Value, ProvisionError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let err = ProvisionError::from_vercel_response(status.as_u16(), &body);
        debug!(status = status.as_u16(), error = %err, "Vercel request failed");
        return Err(err);
    }
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| ProvisionError::Client(format!("Invalid JSON from Vercel: {}", e)))
}

fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_repo_body_shape() {
        let body = CreateRepoBody {
            provider: "github",
            namespace: "alice",
            name: "demo",
            private: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "provider": "github",
                "namespace": "alice",
                "name": "demo",
                "private": false,
            })
        );
    }

    #[test]
    fn test_push_body_uses_type_key() {
        let body = PushToRepoBody {
            kind: "github",
            source: "https://example.com/tpl",
            repo: "alice/demo".to_string(),
            branch: "main",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "github");
        assert_eq!(value["repo"], "alice/demo");
        assert_eq!(value["branch"], "main");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&serde_json::json!("abc")), Some("abc".into()));
        assert_eq!(scalar_to_string(&serde_json::json!(42)), Some("42".into()));
        assert_eq!(scalar_to_string(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = VercelClient::new("k", "https://api.vercel.com/", "https://vercel.com//").unwrap();
        assert_eq!(client.api_url, "https://api.vercel.com");
        assert_eq!(client.dashboard_url, "https://vercel.com");
    }
}
