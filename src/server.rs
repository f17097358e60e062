use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{schemars, tool, tool_handler, tool_router, ServerHandler};
use serde::Deserialize;

use crate::config::DEFAULT_TEMPLATE_SOURCE;
use crate::error::ProvisionError;
use crate::provision::{ProvisionRequest, ProvisionResult, Provisioner};

#[derive(Clone)]
pub struct McpVercelRepoServer {
    provisioner: Arc<Provisioner>,
    default_template: String,
    tool_router: ToolRouter<Self>,
}

// -- Tool parameter types --

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAndPushRepoParams {
    #[schemars(description = "Name of the repository to create")]
    pub repo_name: String,

    #[schemars(description = "URL of the template source to push")]
    #[serde(default)]
    pub template_source: Option<String>,

    #[schemars(description = "Whether the repository should be private (default: true)")]
    #[serde(default)]
    pub is_private: Option<bool>,

    #[schemars(
        description = "GitHub user or organization to create the repository under. Defaults to the token's account"
    )]
    #[serde(default)]
    pub namespace: Option<String>,
}

impl McpVercelRepoServer {
    pub fn new(provisioner: Provisioner, default_template: Option<String>) -> Self {
        Self {
            provisioner: Arc::new(provisioner),
            default_template: default_template
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_SOURCE.to_string()),
            tool_router: Self::tool_router(),
        }
    }

    fn build_request(&self, params: CreateAndPushRepoParams) -> ProvisionRequest {
        ProvisionRequest {
            repo_name: params.repo_name.trim().to_string(),
            template_source: params
                .template_source
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| self.default_template.clone()),
            is_private: params.is_private.unwrap_or(true),
            namespace: params.namespace.filter(|ns| !ns.is_empty()),
        }
    }

    fn err(&self, e: ProvisionError) -> ErrorData {
        e.to_mcp_error()
    }
}

/// Markdown text plus the result as structured content.
pub fn tool_result(result: &ProvisionResult) -> CallToolResult {
    let content = vec![Content::text(result.to_markdown())];
    let mut call_result = if result.success {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    };
    call_result.structured_content = serde_json::to_value(result).ok();
    call_result
}

// -- MCP tool handlers --

#[tool_router]
impl McpVercelRepoServer {
    #[tool(
        name = "createAndPushRepo",
        description = "Create a GitHub repository through Vercel and push a project template into it"
    )]
    async fn create_and_push_repo(
        &self,
        Parameters(params): Parameters<CreateAndPushRepoParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let request = self.build_request(params);
        let result = self
            .provisioner
            .provision(&request)
            .await
            .map_err(|e| self.err(e))?;
        Ok(tool_result(&result))
    }
}

#[tool_handler]
impl ServerHandler for McpVercelRepoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-vercel-repo".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Vercel-GitHub integration server. Use createAndPushRepo to create a GitHub \
                 repository and push a Vercel template (Next.js by default) into it."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Endpoints};
    use crate::provision::Outcome;

    fn make_server(default_template: Option<String>) -> McpVercelRepoServer {
        let credentials = Credentials::new(Some("vk".into()), Some("gh".into())).unwrap();
        let provisioner = Provisioner::new(&credentials, &Endpoints::default(), None).unwrap();
        McpVercelRepoServer::new(provisioner, default_template)
    }

    fn params(json: serde_json::Value) -> CreateAndPushRepoParams {
        serde_json::from_value(json).unwrap()
    }

    // Octocrab needs a Tokio runtime even to build, so these are async.

    #[tokio::test]
    async fn test_build_request_defaults() {
        let server = make_server(None);
        let req = server.build_request(params(serde_json::json!({ "repoName": "demo" })));
        assert_eq!(req.repo_name, "demo");
        assert_eq!(req.template_source, DEFAULT_TEMPLATE_SOURCE);
        assert!(req.is_private);
        assert!(req.namespace.is_none());
    }

    #[tokio::test]
    async fn test_build_request_explicit_values() {
        let server = make_server(None);
        let req = server.build_request(params(serde_json::json!({
            "repoName": "demo",
            "templateSource": "https://github.com/vercel/vercel/tree/main/examples/astro",
            "isPrivate": false,
            "namespace": "acme",
        })));
        assert_eq!(
            req.template_source,
            "https://github.com/vercel/vercel/tree/main/examples/astro"
        );
        assert!(!req.is_private);
        assert_eq!(req.namespace.as_deref(), Some("acme"));
    }

    #[tokio::test]
    async fn test_build_request_uses_configured_template() {
        let server = make_server(Some("https://example.com/tpl".into()));
        let req = server.build_request(params(serde_json::json!({ "repoName": "demo" })));
        assert_eq!(req.template_source, "https://example.com/tpl");
    }

    #[test]
    fn test_params_require_repo_name() {
        let parsed: Result<CreateAndPushRepoParams, _> =
            serde_json::from_value(serde_json::json!({ "isPrivate": true }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_tool_result_failure_is_error_with_metadata() {
        let result = ProvisionResult {
            success: false,
            outcome: Outcome::Failed,
            repo_name: "demo".into(),
            is_private: true,
            template_source: DEFAULT_TEMPLATE_SOURCE.into(),
            github_namespace: Some("alice".into()),
            team_id: None,
            repo_url: None,
            repo_id: None,
            vercel_project_id: None,
            failed_step: Some(crate::provision::Step::CreateRepository),
            error: Some("Repository already exists".into()),
        };
        let call = tool_result(&result);
        assert_eq!(call.is_error, Some(true));
        let meta = call.structured_content.unwrap();
        assert_eq!(meta["success"], false);
        assert_eq!(meta["failedStep"], "create_repository");
        assert_eq!(meta["error"], "Repository already exists");
    }
}
