use deploy_report_core::{ActionConfig, Artifact, artifact::locate};

use crate::reporter::Reporter;

/// Report the result of a wrangler command, based on the output entry it wrote.
///
/// The entry's own type decides how it is reported, not the command that was run.
/// Without an output entry nothing is reported; stdout is never parsed.
pub async fn handle_command_output<R: Reporter>(
    config: &ActionConfig,
    reporter: &R,
    command: &str,
    stdout: &str,
) {
    let Some(artifact) = locate(config.output_dir()).await else {
        tracing::debug!(
            "No wrangler output entry found for `{}` ({} bytes of stdout ignored)",
            command,
            stdout.len()
        );
        return;
    };
    tracing::info!("Reporting {} output of `wrangler {}`", artifact.kind(), command);
    match &artifact {
        Artifact::PagesDeploy(pages) => reporter.report_pages(pages).await,
        Artifact::Deploy(deployment) => reporter.report_workers_deploy(deployment).await,
        Artifact::VersionUpload(upload) => reporter.report_version_upload(upload).await,
    }
}
