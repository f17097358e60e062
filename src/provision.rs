//! Repository provisioning: resolve namespace, resolve team, create the
//! repository, push the template.
//!
//! Every call re-resolves namespace and team; nothing is cached between calls.
//! Steps run strictly in order and the first fatal failure stops the run.
//! A repository created before a failed push is left in place and reported
//! as [`Outcome::Partial`].

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::{Credentials, Endpoints, DEFAULT_TEMPLATE_SOURCE};
use crate::error::ProvisionError;
use crate::github::{repo_html_url, sanitize_github_name, GitHubClient};
use crate::vercel::{CreateRepoBody, PushToRepoBody, VercelClient};

const GIT_PROVIDER: &str = "github";
const TARGET_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub repo_name: String,
    pub template_source: String,
    pub is_private: bool,
    /// Skips the identity lookup when set.
    pub namespace: Option<String>,
}

impl ProvisionRequest {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            template_source: DEFAULT_TEMPLATE_SOURCE.to_string(),
            is_private: true,
            namespace: None,
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        sanitize_github_name(&self.repo_name, "repoName")?;
        if self.template_source.trim().is_empty() {
            return Err(ProvisionError::InvalidParam(
                "templateSource must not be empty".to_string(),
            ));
        }
        if let Some(ref namespace) = self.namespace {
            sanitize_github_name(namespace, "namespace")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    ResolveNamespace,
    ResolveTeam,
    CreateRepository,
    PushTemplate,
}

impl Step {
    pub fn describe(&self) -> &'static str {
        match self {
            Step::ResolveNamespace => "resolve GitHub namespace",
            Step::ResolveTeam => "resolve Vercel team",
            Step::CreateRepository => "create repository",
            Step::PushTemplate => "push template",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    /// Nothing was created remotely.
    Failed,
    /// The repository exists but the template push failed.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResult {
    pub success: bool,
    pub outcome: Outcome,
    pub repo_name: String,
    pub is_private: bool,
    pub template_source: String,
    pub github_namespace: Option<String>,
    pub team_id: Option<String>,
    pub repo_url: Option<String>,
    pub repo_id: Option<String>,
    pub vercel_project_id: Option<String>,
    pub failed_step: Option<Step>,
    pub error: Option<String>,
}

impl ProvisionResult {
    fn started(request: &ProvisionRequest) -> Self {
        Self {
            success: false,
            outcome: Outcome::Failed,
            repo_name: request.repo_name.clone(),
            is_private: request.is_private,
            template_source: request.template_source.clone(),
            github_namespace: None,
            team_id: None,
            repo_url: None,
            repo_id: None,
            vercel_project_id: None,
            failed_step: None,
            error: None,
        }
    }

    fn fail(mut self, step: Step, err: &ProvisionError) -> Self {
        let message = err.provider_message();
        error!(step = step.describe(), error = %message, "Provisioning step failed");
        self.success = false;
        self.outcome = if self.repo_url.is_some() {
            Outcome::Partial
        } else {
            Outcome::Failed
        };
        self.failed_step = Some(step);
        self.error = Some(message);
        self
    }

    /// Markdown summary for humans.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        match self.outcome {
            Outcome::Completed => {
                out.push_str("## Repository created and template pushed\n\n");
            }
            Outcome::Partial => {
                out.push_str("## Repository created, template push failed\n\n");
            }
            Outcome::Failed => out.push_str("## Provisioning failed\n\n"),
        }
        if let Some(ref ns) = self.github_namespace {
            out.push_str(&format!("- **GitHub namespace:** {}\n", ns));
        }
        out.push_str(&format!("- **Repository:** {}\n", self.repo_name));
        out.push_str(&format!(
            "- **Visibility:** {}\n",
            if self.is_private { "private" } else { "public" }
        ));
        out.push_str(&format!("- **Template source:** {}\n", self.template_source));
        if let Some(ref team) = self.team_id {
            out.push_str(&format!("- **Vercel team:** {}\n", team));
        }
        if let Some(ref project) = self.vercel_project_id {
            out.push_str(&format!("- **Vercel project ID:** {}\n", project));
        }
        if let Some(ref url) = self.repo_url {
            out.push_str(&format!("- **Repository URL:** {}\n", url));
        }
        if let (Some(step), Some(err)) = (self.failed_step, self.error.as_deref()) {
            out.push_str(&format!("\n**Failed step:** {}\n\n**Error:** {}\n", step.describe(), err));
        }
        if self.outcome == Outcome::Partial {
            out.push_str(
                "\nThe repository was left in place; delete it manually or push the template again.\n",
            );
        }
        out
    }
}

/// Runs provisioning requests against GitHub and Vercel.
#[derive(Clone)]
pub struct Provisioner {
    github: GitHubClient,
    vercel: VercelClient,
    default_namespace: Option<String>,
}

impl Provisioner {
    pub fn new(
        credentials: &Credentials,
        endpoints: &Endpoints,
        default_namespace: Option<String>,
    ) -> Result<Self, ProvisionError> {
        Ok(Self {
            github: GitHubClient::new(&credentials.github_token, &endpoints.github_api)?,
            vercel: VercelClient::new(
                credentials.vercel_api_key.clone(),
                endpoints.vercel_api.clone(),
                endpoints.vercel.clone(),
            )?,
            default_namespace: default_namespace.filter(|ns| !ns.is_empty()),
        })
    }

    /// Run one provisioning request.
    ///
    /// Invalid requests are rejected before any remote call. Remote failures
    /// are reported in the returned result, never as `Err`.
    #[instrument(skip(self, request), fields(repo = %request.repo_name, private = request.is_private))]
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionResult, ProvisionError> {
        request.validate()?;
        let mut result = ProvisionResult::started(request);

        let namespace = match request.namespace.clone().or_else(|| self.default_namespace.clone()) {
            Some(ns) => ns,
            None => match self.github.current_login().await {
                Ok(login) => login,
                Err(e) => return Ok(result.fail(Step::ResolveNamespace, &e)),
            },
        };
        result.github_namespace = Some(namespace.clone());

        result.team_id = self.resolve_team().await;

        let created = match self
            .vercel
            .create_repo(&CreateRepoBody {
                provider: GIT_PROVIDER,
                namespace: &namespace,
                name: &request.repo_name,
                private: request.is_private,
            })
            .await
        {
            Ok(created) => created,
            Err(e) => return Ok(result.fail(Step::CreateRepository, &e)),
        };
        result.repo_url = Some(
            created
                .url
                .unwrap_or_else(|| repo_html_url(&namespace, &request.repo_name)),
        );
        result.repo_id = created.id;
        info!(repo_url = result.repo_url.as_deref().unwrap_or_default(), "Repository created");

        let pushed = match self
            .vercel
            .push_to_repo(
                &PushToRepoBody {
                    kind: GIT_PROVIDER,
                    source: &request.template_source,
                    repo: format!("{}/{}", namespace, request.repo_name),
                    branch: TARGET_BRANCH,
                },
                result.team_id.as_deref(),
            )
            .await
        {
            Ok(pushed) => pushed,
            Err(e) => return Ok(result.fail(Step::PushTemplate, &e)),
        };

        result.vercel_project_id = pushed.project_id;
        result.success = true;
        result.outcome = Outcome::Completed;
        info!(
            project_id = result.vercel_project_id.as_deref().unwrap_or("unknown"),
            "Template pushed"
        );
        Ok(result)
    }

    /// Never fails: an unreachable or empty team list means personal scope.
    async fn resolve_team(&self) -> Option<String> {
        match self.vercel.default_team_id().await {
            Ok(team) => team,
            Err(e) => {
                warn!(
                    step = Step::ResolveTeam.describe(),
                    error = %e,
                    "Could not fetch Vercel teams, proceeding without team ID"
                );
                None
            }
        }
    }
}
