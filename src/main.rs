use anyhow::Result;
use clap::{Parser, Subcommand};
use mcp_vercel_repo::config::{
    resolve_secret, Credentials, Endpoints, DEFAULT_GITHUB_API_URL, DEFAULT_VERCEL_API_URL,
    DEFAULT_VERCEL_URL,
};
use mcp_vercel_repo::provision::{ProvisionRequest, Provisioner};
use mcp_vercel_repo::server;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

/// MCP server that creates GitHub repositories and pushes Vercel templates into them
#[derive(Parser)]
#[command(name = "mcp-vercel-repo", version, about)]
struct Cli {
    /// Vercel API key.
    /// Can also be set via VERCEL_API_KEY environment variable.
    #[arg(long, short = 'v', global = true, aliases = ["VERCELL_API_KEY", "vercel-key"])]
    vercel_api_key: Option<String>,

    /// Read the Vercel API key from an environment variable.
    /// Default: VERCEL_API_KEY
    #[arg(long = "vercel-api-key-env", global = true)]
    vercel_api_key_env: Option<String>,

    /// GitHub personal access token.
    /// Can also be set via GITHUB_TOKEN environment variable.
    #[arg(long, short = 'g', global = true, alias = "GITHUB_TOKEN")]
    github_token: Option<String>,

    /// Read the GitHub token from an environment variable.
    /// Default: GITHUB_TOKEN
    #[arg(long = "github-token-env", global = true)]
    github_token_env: Option<String>,

    /// Default GitHub namespace; skips the identity lookup when set
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Default template source pushed into new repositories
    #[arg(long, global = true)]
    template: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,

    /// Vercel API base URL (teams)
    #[arg(long, global = true, default_value = DEFAULT_VERCEL_API_URL)]
    vercel_api_url: String,

    /// Vercel base URL (git integrations)
    #[arg(long, global = true, default_value = DEFAULT_VERCEL_URL)]
    vercel_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the MCP tool over stdio (default)
    Serve,
    /// Create one repository, push the template and exit
    Provision {
        /// Name of the repository to create
        repo_name: String,

        /// Create a public repository instead of a private one
        #[arg(long)]
        public: bool,

        /// Print the result as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Resolve secrets: --flag > --*-env > default variable
    let vercel_api_key = resolve_secret(
        cli.vercel_api_key,
        cli.vercel_api_key_env.as_deref(),
        "VERCEL_API_KEY",
    );
    let github_token = resolve_secret(
        cli.github_token,
        cli.github_token_env.as_deref(),
        "GITHUB_TOKEN",
    );

    let credentials = match Credentials::new(vercel_api_key, github_token) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let endpoints = Endpoints {
        github_api: cli.github_api_url,
        vercel_api: cli.vercel_api_url,
        vercel: cli.vercel_url,
    };
    let provisioner = Provisioner::new(&credentials, &endpoints, cli.namespace.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create API clients: {}", e))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(
                namespace = cli.namespace.as_deref().unwrap_or("from token"),
                "Starting mcp-vercel-repo server"
            );
            let service = server::McpVercelRepoServer::new(provisioner, cli.template);
            let running = service.serve(stdio()).await?;
            running.waiting().await?;
        }
        Command::Provision {
            repo_name,
            public,
            json,
        } => {
            let mut request = ProvisionRequest::new(repo_name);
            request.is_private = !public;
            if let Some(template) = cli.template {
                request.template_source = template;
            }
            let result = provisioner.provision(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result.to_markdown());
            }
            if !result.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
