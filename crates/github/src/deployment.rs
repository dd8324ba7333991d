use anyhow::{Context, Result};
use deploy_report_core::config::GitHubContext;
use http::StatusCode;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

const DASHBOARD_URL: &str = "https://dash.cloudflare.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Pages,
    Workers,
}

impl Platform {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Pages => "Cloudflare Pages",
            Self::Workers => "Cloudflare Workers",
        }
    }
}

/// Everything needed to create a deployment and mark it successful.
#[derive(Debug, Clone)]
pub struct DeploymentRequest<'a> {
    pub platform: Platform,
    pub environment: &'a str,
    pub production_environment: bool,
    /// Only sent when the deployment URL could be validated.
    pub environment_url: Option<&'a str>,
    pub log_url: String,
}

#[derive(Serialize)]
struct CreateDeployment<'a> {
    #[serde(rename = "ref")]
    ref_: &'a str,
    auto_merge: bool,
    description: &'a str,
    required_contexts: &'a [&'a str],
    environment: &'a str,
    production_environment: bool,
}

#[derive(Serialize)]
struct CreateDeploymentStatus<'a> {
    environment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment_url: Option<&'a str>,
    production_environment: bool,
    log_url: &'a str,
    description: &'a str,
    state: &'a str,
    auto_inactive: bool,
}

#[derive(Deserialize)]
struct Deployment {
    id: u64,
}

pub fn pages_log_url(account_id: &str, project: &str, deployment_id: Option<&str>) -> String {
    match deployment_id {
        Some(deployment_id) => {
            format!("{DASHBOARD_URL}/{account_id}/pages/view/{project}/{deployment_id}")
        }
        None => format!("{DASHBOARD_URL}/{account_id}/pages/view/{project}"),
    }
}

pub fn workers_log_url(account_id: &str, service_name: Option<&str>) -> String {
    match service_name {
        Some(name) => format!("{DASHBOARD_URL}/{account_id}/workers/services/view/{name}"),
        None => format!("{DASHBOARD_URL}/{account_id}/workers"),
    }
}

/// Workers have no configured production branch; `main` and `master` are production.
pub fn workers_environment(branch: Option<&str>) -> &'static str {
    if matches!(branch, Some("main" | "master")) { "production" } else { "preview" }
}

/// Create a deployment for the current ref. Returns `None` if GitHub didn't create one.
pub async fn create_deployment(
    client: &Octocrab,
    context: &GitHubContext,
    request: &DeploymentRequest<'_>,
) -> Result<Option<u64>> {
    let route = format!("/repos/{}/{}/deployments", context.owner, context.repo);
    let response = client
        ._post(route, Some(&CreateDeployment {
            ref_: context.deployment_ref(),
            auto_merge: false,
            description: request.platform.description(),
            required_contexts: &[],
            environment: request.environment,
            production_environment: request.production_environment,
        }))
        .await
        .context("Failed to create deployment")?;
    if response.status() != StatusCode::CREATED {
        tracing::info!("Error creating GitHub deployment: {}", response.status());
        return Ok(None);
    }
    let body = client.body_to_string(response).await.context("Failed to read deployment")?;
    let deployment: Deployment =
        serde_json::from_str(&body).context("Failed to parse deployment response")?;
    Ok(Some(deployment.id))
}

pub async fn create_deployment_status(
    client: &Octocrab,
    context: &GitHubContext,
    deployment_id: u64,
    request: &DeploymentRequest<'_>,
) -> Result<()> {
    let route =
        format!("/repos/{}/{}/deployments/{}/statuses", context.owner, context.repo, deployment_id);
    let _: serde_json::Value = client
        .post(route, Some(&CreateDeploymentStatus {
            environment: request.environment,
            environment_url: request.environment_url,
            production_environment: request.production_environment,
            log_url: &request.log_url,
            description: request.platform.description(),
            state: "success",
            auto_inactive: false,
        }))
        .await
        .with_context(|| format!("Failed to create status for deployment {deployment_id}"))?;
    Ok(())
}

/// Create a deployment and immediately mark it successful.
pub async fn report_deployment(
    client: &Octocrab,
    context: &GitHubContext,
    request: &DeploymentRequest<'_>,
) -> Result<()> {
    let Some(deployment_id) = create_deployment(client, context, request).await? else {
        return Ok(());
    };
    tracing::debug!(
        "Created {} deployment {} in {}/{}",
        request.environment,
        deployment_id,
        context.owner,
        context.repo
    );
    create_deployment_status(client, context, deployment_id, request).await
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::tests::{test_client, test_context};

    #[test]
    fn test_log_urls() {
        assert_eq!(
            pages_log_url("account", "project", Some("abc123")),
            "https://dash.cloudflare.com/account/pages/view/project/abc123"
        );
        assert_eq!(
            pages_log_url("account", "project", None),
            "https://dash.cloudflare.com/account/pages/view/project"
        );
        assert_eq!(
            workers_log_url("account", Some("my-worker")),
            "https://dash.cloudflare.com/account/workers/services/view/my-worker"
        );
        assert_eq!(workers_log_url("account", None), "https://dash.cloudflare.com/account/workers");
    }

    #[test]
    fn test_workers_environment() {
        let cases: &[(Option<&str>, &str)] = &[
            (Some("main"), "production"),
            (Some("master"), "production"),
            (Some("feature"), "preview"),
            (Some("main-2"), "preview"),
            (None, "preview"),
        ];
        for &(branch, expected) in cases {
            assert_eq!(workers_environment(branch), expected, "{branch:?}");
        }
    }

    #[tokio::test]
    async fn test_report_deployment() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/repos/mock-user/wrangler-action/deployments")
            .match_body(Matcher::Json(json!({
                "ref": "production-branch",
                "auto_merge": false,
                "description": "Cloudflare Pages",
                "required_contexts": [],
                "environment": "production",
                "production_environment": true,
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":123}"#)
            .expect(1)
            .create_async()
            .await;
        let status = server
            .mock("POST", "/repos/mock-user/wrangler-action/deployments/123/statuses")
            .match_body(Matcher::Json(json!({
                "environment": "production",
                "environment_url": "https://fake-deployment-url.com",
                "production_environment": true,
                "log_url": "https://dash.cloudflare.com/account/pages/view/fake-project-name/fake-deployment-id",
                "description": "Cloudflare Pages",
                "state": "success",
                "auto_inactive": false,
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body("null")
            .expect(1)
            .create_async()
            .await;

        let mut context = test_context();
        context.ref_name = Some("production-branch".to_string());
        let request = DeploymentRequest {
            platform: Platform::Pages,
            environment: "production",
            production_environment: true,
            environment_url: Some("https://fake-deployment-url.com"),
            log_url: pages_log_url("account", "fake-project-name", Some("fake-deployment-id")),
        };
        report_deployment(&test_client(&server), &context, &request).await.unwrap();
        create.assert_async().await;
        status.assert_async().await;
    }

    #[tokio::test]
    async fn test_report_deployment_omits_invalid_url() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/repos/mock-user/wrangler-action/deployments")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":7}"#)
            .create_async()
            .await;
        let status = server
            .mock("POST", "/repos/mock-user/wrangler-action/deployments/7/statuses")
            .match_body(Matcher::Json(json!({
                "environment": "preview",
                "production_environment": false,
                "log_url": "https://dash.cloudflare.com/account/workers",
                "description": "Cloudflare Workers",
                "state": "success",
                "auto_inactive": false,
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let request = DeploymentRequest {
            platform: Platform::Workers,
            environment: "preview",
            production_environment: false,
            environment_url: None,
            log_url: workers_log_url("account", None),
        };
        report_deployment(&test_client(&server), &test_context(), &request).await.unwrap();
        status.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_deployment_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _create = server
            .mock("POST", "/repos/mock-user/wrangler-action/deployments")
            .with_status(409)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Conflict"}"#)
            .create_async()
            .await;
        let status = server
            .mock("POST", Matcher::Regex(r"/statuses$".to_string()))
            .expect(0)
            .create_async()
            .await;

        let request = DeploymentRequest {
            platform: Platform::Workers,
            environment: "preview",
            production_environment: false,
            environment_url: None,
            log_url: workers_log_url("account", None),
        };
        let client = test_client(&server);
        assert_eq!(create_deployment(&client, &test_context(), &request).await.unwrap(), None);
        report_deployment(&client, &test_context(), &request).await.unwrap();
        status.assert_async().await;
    }
}
