use std::fmt;

use crate::error::ProvisionError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_VERCEL_API_URL: &str = "https://api.vercel.com";
pub const DEFAULT_VERCEL_URL: &str = "https://vercel.com";
pub const DEFAULT_TEMPLATE_SOURCE: &str =
    "https://github.com/vercel/vercel/tree/main/examples/nextjs";

/// API keys used for every provisioning call. Read-only once built.
#[derive(Clone)]
pub struct Credentials {
    pub vercel_api_key: String,
    pub github_token: String,
}

impl Credentials {
    /// Build credentials, rejecting empty or missing values.
    pub fn new(
        vercel_api_key: Option<String>,
        github_token: Option<String>,
    ) -> Result<Self, ProvisionError> {
        match (non_empty(vercel_api_key), non_empty(github_token)) {
            (Some(vercel_api_key), Some(github_token)) => Ok(Self {
                vercel_api_key,
                github_token,
            }),
            _ => Err(ProvisionError::MissingCredentials),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("vercel_api_key", &"[REDACTED]")
            .field("github_token", &"[REDACTED]")
            .finish()
    }
}

/// Base URLs of the remote providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub github_api: String,
    pub vercel_api: String,
    pub vercel: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: DEFAULT_GITHUB_API_URL.to_string(),
            vercel_api: DEFAULT_VERCEL_API_URL.to_string(),
            vercel: DEFAULT_VERCEL_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every provider at the same base URL (used by tests and proxies).
    pub fn single(base: &str) -> Self {
        Self {
            github_api: base.to_string(),
            vercel_api: base.to_string(),
            vercel: base.to_string(),
        }
    }
}

/// Resolve a secret: explicit flag > `env_name` (if given) > `default_env`.
pub fn resolve_secret(
    flag: Option<String>,
    env_name: Option<&str>,
    default_env: &str,
) -> Option<String> {
    if let Some(value) = non_empty(flag) {
        return Some(value);
    }
    let env_name = env_name.unwrap_or(default_env);
    match std::env::var(env_name) {
        Ok(value) if !value.is_empty() => {
            tracing::info!(env = env_name, "Read secret from environment variable");
            Some(value)
        }
        _ => None,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_both_present() {
        let creds = Credentials::new(Some("vk".into()), Some("gh".into())).unwrap();
        assert_eq!(creds.vercel_api_key, "vk");
        assert_eq!(creds.github_token, "gh");
    }

    #[test]
    fn test_credentials_missing_vercel_key() {
        let err = Credentials::new(None, Some("gh".into())).unwrap_err();
        assert!(matches!(err, ProvisionError::MissingCredentials));
    }

    #[test]
    fn test_credentials_empty_token_is_missing() {
        assert!(Credentials::new(Some("vk".into()), Some(String::new())).is_err());
        assert!(Credentials::new(Some("  ".into()), Some("gh".into())).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials::new(Some("secret-vk".into()), Some("secret-gh".into())).unwrap();
        let out = format!("{:?}", creds);
        assert!(!out.contains("secret-vk"));
        assert!(!out.contains("secret-gh"));
        assert!(out.contains("REDACTED"));
    }

    #[test]
    fn test_resolve_secret_flag_wins() {
        let value = resolve_secret(Some("flag".into()), None, "MCP_VERCEL_REPO_TEST_UNSET");
        assert_eq!(value.as_deref(), Some("flag"));
    }

    #[test]
    fn test_resolve_secret_named_env() {
        std::env::set_var("MCP_VERCEL_REPO_TEST_NAMED", "from-env");
        let value = resolve_secret(
            None,
            Some("MCP_VERCEL_REPO_TEST_NAMED"),
            "MCP_VERCEL_REPO_TEST_UNSET",
        );
        assert_eq!(value.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_resolve_secret_empty_flag_falls_through() {
        std::env::set_var("MCP_VERCEL_REPO_TEST_DEFAULT", "fallback");
        let value = resolve_secret(Some(String::new()), None, "MCP_VERCEL_REPO_TEST_DEFAULT");
        assert_eq!(value.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_resolve_secret_absent() {
        assert!(resolve_secret(None, None, "MCP_VERCEL_REPO_TEST_UNSET").is_none());
    }

    #[test]
    fn test_endpoints_default() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.github_api, "https://api.github.com");
        assert_eq!(endpoints.vercel_api, "https://api.vercel.com");
        assert_eq!(endpoints.vercel, "https://vercel.com");
    }
}
