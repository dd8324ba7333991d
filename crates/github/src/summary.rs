use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tokio::io::AsyncWriteExt;

const TABLE_HEADER: &str = "| Name                    | Result |\n| ----------------------- | - |\n";

pub fn pages_summary(
    commit_hash: &str,
    deployment_url: Option<&str>,
    alias_url: Option<&str>,
) -> String {
    let mut summary = String::from("\n# Deploying with Cloudflare Pages\n\n");
    summary.push_str(TABLE_HEADER);
    summary.push_str(&format!("| **Last commit:**        | {} |\n", commit_hash));
    summary.push_str(&format!("| **Preview URL**:        | {} |\n", deployment_url.unwrap_or("N/A")));
    summary.push_str(&format!("| **Branch Preview URL**: | {} |\n", alias_url.unwrap_or("N/A")));
    summary
}

pub fn workers_summary(
    commit_hash: Option<&str>,
    deployment_url: Option<&str>,
    worker_name: Option<&str>,
) -> String {
    let mut summary = String::from("\n# Deploying with Cloudflare Workers\n\n");
    summary.push_str(TABLE_HEADER);
    if let Some(commit_hash) = commit_hash {
        summary.push_str(&format!("| **Last commit:**        | {} |\n", commit_hash));
    }
    if let Some(worker_name) = worker_name {
        summary.push_str(&format!("| **Worker Name:**        | {} |\n", worker_name));
    }
    summary.push_str(&format!("| **Deployment URL**:     | {} |\n", deployment_url.unwrap_or("N/A")));
    summary
}

/// Append markdown to the job's step summary file.
pub async fn append_summary(path: Option<&Path>, markdown: &str) -> Result<()> {
    let path = path.ok_or_else(|| anyhow!("No step summary file configured"))?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open step summary {}", path.display()))?;
    file.write_all(markdown.as_bytes())
        .await
        .with_context(|| format!("Failed to write step summary {}", path.display()))?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_summary() {
        let summary = pages_summary(
            "fake-commit-hash",
            Some("https://fake-deployment-url.com"),
            Some("https://fake-alias-url.com"),
        );
        assert_eq!(
            summary,
            "
# Deploying with Cloudflare Pages

| Name                    | Result |
| ----------------------- | - |
| **Last commit:**        | fake-commit-hash |
| **Preview URL**:        | https://fake-deployment-url.com |
| **Branch Preview URL**: | https://fake-alias-url.com |
"
        );
    }

    #[test]
    fn test_workers_summary() {
        let summary = workers_summary(
            Some("fake-commit-hash"),
            Some("https://my-worker.example.workers.dev"),
            Some("my-worker"),
        );
        assert_eq!(
            summary,
            "
# Deploying with Cloudflare Workers

| Name                    | Result |
| ----------------------- | - |
| **Last commit:**        | fake-commit-hash |
| **Worker Name:**        | my-worker |
| **Deployment URL**:     | https://my-worker.example.workers.dev |
"
        );
    }

    #[test]
    fn test_workers_summary_optional_rows() {
        let summary = workers_summary(None, None, None);
        assert!(!summary.contains("Last commit"));
        assert!(!summary.contains("Worker Name"));
        assert!(summary.ends_with("| **Deployment URL**:     | N/A |\n"));
    }

    #[tokio::test]
    async fn test_append_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary");
        append_summary(Some(&path), "first\n").await.unwrap();
        append_summary(Some(&path), "second\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        assert!(append_summary(None, "ignored").await.is_err());
    }
}
