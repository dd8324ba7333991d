use std::sync::Arc;

use anyhow::Result;
use deploy_report_core::{
    ActionConfig,
    artifact::{PagesDeployment, VersionUpload, WorkersDeployment},
    util::{normalize_deployment_url, short_hash},
};
use octocrab::Octocrab;

use crate::{
    build_client,
    deployment::{
        DeploymentRequest, Platform, pages_log_url, report_deployment, workers_environment,
        workers_log_url,
    },
    summary::{append_summary, pages_summary, workers_summary},
};

/// Reflects a wrangler output entry back into the repository.
///
/// Reporting is best-effort: implementations log failures instead of returning them.
#[allow(async_fn_in_trait)]
pub trait Reporter {
    async fn report_pages(&self, artifact: &PagesDeployment);
    async fn report_workers_deploy(&self, artifact: &WorkersDeployment);
    async fn report_version_upload(&self, artifact: &VersionUpload);
}

/// Creates GitHub deployments and job summaries.
pub struct GitHubReporter {
    config: Arc<ActionConfig>,
    /// `None` when no token is configured, which disables reporting.
    client: Option<Octocrab>,
}

impl GitHubReporter {
    pub fn new(config: Arc<ActionConfig>) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    pub fn with_client(config: Arc<ActionConfig>, client: Option<Octocrab>) -> Self {
        Self { config, client }
    }

    async fn report_workers(&self, label: &str, deployment_url: Option<&str>) {
        let Some(client) = &self.client else {
            return;
        };
        let context = &self.config.github;
        let normalized = normalize_deployment_url(deployment_url);
        let service_name = normalized.service_name.as_deref();
        let environment = workers_environment(context.branch());
        let request = DeploymentRequest {
            platform: Platform::Workers,
            environment,
            production_environment: environment == "production",
            environment_url: normalized.as_str(),
            log_url: workers_log_url(self.config.account_id(), service_name),
        };
        let summary = workers_summary(
            context.short_sha(),
            normalized.as_str().or(deployment_url),
            service_name,
        );

        let (deployment_result, summary_result) = tokio::join!(
            report_deployment(client, context, &request),
            append_summary(context.step_summary.as_deref(), &summary),
        );
        if let Err(e) = deployment_result {
            tracing::warn!("Creating {} GitHub deployment failed: {:?}", label, e);
        }
        if let Err(e) = summary_result {
            tracing::warn!("Creating {} GitHub job summary failed: {:?}", label, e);
        }
    }
}

impl Reporter for GitHubReporter {
    async fn report_pages(&self, artifact: &PagesDeployment) {
        let Some(client) = &self.client else {
            return;
        };
        let (Some(production_branch), Some(project), Some(trigger)) = (
            artifact.production_branch.as_deref(),
            artifact.pages_project.as_deref(),
            artifact.deployment_trigger.as_ref(),
        ) else {
            tracing::debug!("Pages output is missing project details, skipping GitHub deployment");
            return;
        };
        let context = &self.config.github;
        let normalized = normalize_deployment_url(artifact.url.as_deref());
        let request = DeploymentRequest {
            platform: Platform::Pages,
            environment: artifact.environment.as_str(),
            production_environment: context.branch() == Some(production_branch),
            environment_url: normalized.as_str(),
            log_url: pages_log_url(
                self.config.account_id(),
                project,
                artifact.deployment_id.as_deref(),
            ),
        };
        let summary = pages_summary(
            short_hash(&trigger.metadata.commit_hash),
            artifact.url.as_deref(),
            artifact.alias.as_deref(),
        );

        let (deployment_result, summary_result) = tokio::join!(
            report_deployment(client, context, &request),
            append_summary(context.step_summary.as_deref(), &summary),
        );
        if let Err(e) = deployment_result {
            tracing::warn!("Creating GitHub deployment failed: {:?}", e);
        }
        if let Err(e) = summary_result {
            tracing::warn!("Creating GitHub job summary failed: {:?}", e);
        }
    }

    async fn report_workers_deploy(&self, artifact: &WorkersDeployment) {
        self.report_workers("Workers", artifact.deployment_url()).await
    }

    async fn report_version_upload(&self, artifact: &VersionUpload) {
        self.report_workers("Workers Versions", artifact.deployment_url()).await
    }
}
