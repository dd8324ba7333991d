use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::fs::ReadDir;

/// Output entry schema version. Only version 1 is understood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct OutputVersion;

impl TryFrom<u64> for OutputVersion {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 1 { Ok(Self) } else { Err(format!("unsupported output version {value}")) }
    }
}

impl From<OutputVersion> for u64 {
    fn from(_: OutputVersion) -> Self { 1 }
}

/// A supported wrangler output entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum Artifact {
    #[serde(rename = "pages-deploy-detailed")]
    PagesDeploy(PagesDeployment),
    #[serde(rename = "deploy")]
    Deploy(WorkersDeployment),
    #[serde(rename = "version-upload")]
    VersionUpload(VersionUpload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PagesEnvironment {
    Production,
    Preview,
}

impl PagesEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Preview => "preview",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PagesDeployment {
    pub version: OutputVersion,
    #[serde(deserialize_with = "nullable")]
    pub pages_project: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub environment: PagesEnvironment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_trigger: Option<DeploymentTrigger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploymentTrigger {
    pub metadata: DeploymentTriggerMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeploymentTriggerMetadata {
    /// Commit hash of the deployment trigger for the Pages project.
    pub commit_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkersDeployment {
    pub version: OutputVersion,
    /// HTTP triggers associated with the deployment. The first is the deployment URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
}

impl WorkersDeployment {
    pub fn deployment_url(&self) -> Option<&str> {
        self.targets.as_deref().and_then(<[String]>::first).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VersionUpload {
    pub version: OutputVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_alias_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrangler_environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_name_overridden: Option<bool>,
}

impl VersionUpload {
    pub fn deployment_url(&self) -> Option<&str> { self.preview_url.as_deref() }
}

/// The key must be present, but its value may be null.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

impl Artifact {
    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).context("Failed to parse output entry")
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PagesDeploy(_) => "pages-deploy-detailed",
            Self::Deploy(_) => "deploy",
            Self::VersionUpload(_) => "version-upload",
        }
    }
}

/// Whether a file name follows wrangler's `wrangler-output-<timestamp>-<hash>.json` convention.
pub fn is_artifact_file_name(name: &str) -> bool {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"^wrangler-output-(?P<timestamp>.+)-(?P<hash>[^-]+)\.json$").unwrap())
        .is_match(name)
}

async fn next_artifact_file(entries: &mut ReadDir) -> Result<Option<PathBuf>> {
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !is_artifact_file_name(name) || entry.file_type().await?.is_dir() {
            continue;
        }
        return Ok(Some(entry.path()));
    }
    Ok(None)
}

/// All wrangler artifact files in a directory, in listing order.
pub async fn wrangler_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut result = vec![];
    while let Some(path) = next_artifact_file(&mut entries).await? {
        result.push(path);
    }
    Ok(result)
}

pub async fn read_artifact(path: &Path) -> Result<Artifact> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Artifact::parse(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Find the first supported output entry in the wrangler output directory.
///
/// A missing directory, unreadable files and unsupported entries are not errors;
/// they are skipped and `None` is returned if nothing usable remains.
pub async fn locate(dir: &Path) -> Option<Artifact> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("No wrangler output directory at {}: {}", dir.display(), e);
            return None;
        }
    };
    loop {
        let path = match next_artifact_file(&mut entries).await {
            Ok(Some(path)) => path,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!("Failed to list {}: {:?}", dir.display(), e);
                return None;
            }
        };
        match read_artifact(&path).await {
            Ok(artifact) => {
                tracing::debug!("Found {} output entry in {}", artifact.kind(), path.display());
                return Some(artifact);
            }
            Err(e) => tracing::debug!("Skipping {}: {:?}", path.display(), e),
        }
    }
}
