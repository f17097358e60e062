//! MCP server that provisions a GitHub repository from a Vercel template.
//!
//! Resolves the GitHub namespace behind a token, picks the default Vercel team,
//! asks Vercel to create the repository and then pushes a project template
//! into it through the push-to-repo integration.

pub mod config;
pub mod error;
pub mod github;
pub mod provision;
pub mod server;
pub mod vercel;
