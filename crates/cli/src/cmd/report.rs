use std::{fs::File, io::BufReader, path::Path, sync::Arc};

use anyhow::{Context, Result};
use argp::FromArgs;
use deploy_report_core::ActionConfig;
use deploy_report_github::{output::handle_command_output, reporter::GitHubReporter};
use typed_path::Utf8NativePathBuf;

use crate::util::{native_path, std_path};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Report a wrangler command's output as a GitHub deployment and job summary.
#[argp(subcommand, name = "report")]
pub struct Args {
    #[argp(option, short = 'c')]
    /// wrangler command that was run (e.g. "deploy", "versions upload")
    command: String,
    #[argp(option, short = 's', from_str_fn(native_path))]
    /// file containing the command's stdout
    stdout: Option<Utf8NativePathBuf>,
    #[argp(option, short = 'o', from_str_fn(native_path))]
    /// wrangler output directory (overrides WRANGLER_OUTPUT_DIR)
    output_dir: Option<Utf8NativePathBuf>,
    #[argp(option, from_str_fn(native_path))]
    /// read configuration from a YAML file instead of the environment
    config: Option<Utf8NativePathBuf>,
}

pub fn load_config(path: Option<&Path>) -> Result<ActionConfig> {
    match path {
        Some(path) => {
            let file = BufReader::new(
                File::open(path)
                    .with_context(|| format!("Failed to open config file {}", path.display()))?,
            );
            serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        }
        None => ActionConfig::from_env().context("Failed to read configuration from environment"),
    }
}

pub async fn run(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_ref().map(std_path).as_deref())?;
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = std_path(output_dir);
    }
    crate::init_logging(config.quiet);

    let stdout = match &args.stdout {
        Some(path) => std::fs::read_to_string(std_path(path))
            .with_context(|| format!("Failed to read {}", path))?,
        None => String::new(),
    };

    let config = Arc::new(config);
    let reporter = match GitHubReporter::new(config.clone()) {
        Ok(reporter) => reporter,
        Err(e) => {
            tracing::warn!("Skipping GitHub reporting: {:?}", e);
            return Ok(());
        }
    };
    handle_command_output(&config, &reporter, &args.command, &stdout).await;
    Ok(())
}
