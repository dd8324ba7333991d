use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    /// Token used for the deployments API. Reporting is disabled without one.
    pub github_token: Option<String>,
    /// Cloudflare account, used to build dashboard links.
    pub account_id: Option<String>,
    /// Directory wrangler writes its output artifacts to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub github: GitHubContext,
}

/// The workflow run this step is executing in.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubContext {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    pub sha: Option<String>,
    #[serde(rename = "ref")]
    pub ref_: Option<String>,
    pub head_ref: Option<String>,
    pub ref_name: Option<String>,
    /// File the job summary is appended to.
    pub step_summary: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf { env::temp_dir().join("wranglerArtifacts") }

fn default_api_url() -> String { DEFAULT_API_URL.to_string() }

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            account_id: None,
            output_dir: default_output_dir(),
            quiet: false,
            github: GitHubContext::default(),
        }
    }
}

impl Default for GitHubContext {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            owner: String::new(),
            repo: String::new(),
            sha: None,
            ref_: None,
            head_ref: None,
            ref_name: None,
            step_summary: None,
        }
    }
}

impl ActionConfig {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|name| env::var(name).ok()) }

    /// Build the configuration from environment-style variables.
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let (owner, repo) = match var("GITHUB_REPOSITORY") {
            Some(repository) => {
                let (owner, repo) = repository.split_once('/').ok_or_else(|| {
                    anyhow!("Invalid GITHUB_REPOSITORY '{repository}', expected owner/repo")
                })?;
                (owner.to_string(), repo.to_string())
            }
            None => (String::new(), String::new()),
        };
        let quiet = var("QUIET_MODE")
            .or_else(|| var("INPUT_QUIET"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");
        Ok(Self {
            github_token: var("GITHUB_TOKEN"),
            account_id: var("CLOUDFLARE_ACCOUNT_ID"),
            output_dir: var("WRANGLER_OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(default_output_dir),
            quiet,
            github: GitHubContext {
                api_url: var("GITHUB_API_URL").unwrap_or_else(default_api_url),
                owner,
                repo,
                sha: var("GITHUB_SHA"),
                ref_: var("GITHUB_REF"),
                head_ref: var("GITHUB_HEAD_REF"),
                ref_name: var("GITHUB_REF_NAME"),
                step_summary: var("GITHUB_STEP_SUMMARY").map(PathBuf::from),
            },
        })
    }

    pub fn output_dir(&self) -> &Path { &self.output_dir }

    pub fn account_id(&self) -> &str { self.account_id.as_deref().unwrap_or_default() }
}

impl GitHubContext {
    /// The branch being built: the pull request head ref, falling back to the ref name.
    pub fn branch(&self) -> Option<&str> {
        self.head_ref
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.ref_name.as_deref().filter(|s| !s.is_empty()))
    }

    /// Ref to attach a deployment to: the branch if known, otherwise the full ref.
    pub fn deployment_ref(&self) -> &str {
        self.branch().or(self.ref_.as_deref()).unwrap_or_default()
    }

    /// Abbreviated commit SHA of the run.
    pub fn short_sha(&self) -> Option<&str> { self.sha.as_deref().map(crate::util::short_hash) }
}
