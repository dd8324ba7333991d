pub mod deployment;
pub mod output;
pub mod reporter;
pub mod summary;

use anyhow::{Context, Result};
use deploy_report_core::ActionConfig;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};

/// Create a GitHub API client, or `None` if no token is configured.
///
/// Requests are never retried.
pub fn build_client(config: &ActionConfig) -> Result<Option<Octocrab>> {
    let Some(token) = &config.github_token else {
        tracing::debug!("No GitHub token configured, GitHub reporting disabled");
        return Ok(None);
    };
    let client = Octocrab::builder()
        .base_uri(config.github.api_url.as_str())
        .with_context(|| format!("Invalid GitHub API URL '{}'", config.github.api_url))?
        .personal_token(token.clone())
        .add_retry_config(RetryConfig::None)
        .build()
        .context("Failed to create GitHub client")?;
    Ok(Some(client))
}
