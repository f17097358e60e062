use rmcp::model::ErrorData;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Missing required parameters --vercel-api-key and --github-token")]
    MissingCredentials,

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("GitHub API error: {}", octocrab_message(.0))]
    GitHub(#[from] octocrab::Error),

    #[error("GitHub API error ({status}): {message}")]
    GitHubApi { status: u16, message: String },

    #[error("Vercel API error ({status}): {message}")]
    Vercel { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Client(String),
}

impl ProvisionError {
    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            ProvisionError::InvalidParam(_) | ProvisionError::MissingCredentials => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            ProvisionError::GitHub(_)
            | ProvisionError::GitHubApi { .. }
            | ProvisionError::Vercel { .. }
            | ProvisionError::Http(_)
            | ProvisionError::Client(_) => ErrorData::internal_error(self.to_string(), None),
        }
    }

    /// The message a provider reported, without our own prefixes.
    pub fn provider_message(&self) -> String {
        match self {
            ProvisionError::GitHub(e) => octocrab_message(e),
            ProvisionError::GitHubApi { message, .. } | ProvisionError::Vercel { message, .. } => {
                message.clone()
            }
            ProvisionError::Http(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    /// Build a `Vercel` error from a non-success response body.
    pub fn from_vercel_response(status: u16, body: &str) -> Self {
        ProvisionError::Vercel {
            status,
            message: message_from_body(status, body),
        }
    }

    /// Build a `GitHubApi` error from a non-success response body.
    pub fn from_github_response(status: u16, body: &str) -> Self {
        ProvisionError::GitHubApi {
            status,
            message: message_from_body(status, body),
        }
    }
}

/// Precedence: `error.message`, then `message`, then a transport-level
/// description of the status.
fn message_from_body(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .or_else(|| v.get("message").and_then(|m| m.as_str()))
        })
        .filter(|m| !m.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("Request failed with status code {}", status))
}

/// Octocrab's `Display` appends a captured backtrace; keep only the cause.
fn octocrab_message(e: &octocrab::Error) -> String {
    match e {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => std::error::Error::source(other)
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                other
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .to_string()
            }),
    }
}
