//! `install` subcommand

use std::path::Path;

use diffdirs_bootstrap::{
    BootstrapConfig, BootstrapError, BootstrapOutcome, BootstrapPlan, BootstrapSequencer,
    CommandFetcher, DownloadMethod, HttpFetcher, Platform, ProgressSink, TracingSink,
};
use diffdirs_process::TokioProcessRunner;
use miette::{IntoDiagnostic, Result};
use tracing::{debug, info};

use crate::cli::{DownloadArg, OutputFormat, TargetArgs};
use crate::commands::{load_config, plugin_root, resolve_tier};
use crate::output::JsonLinesSink;
use crate::utils::create_tokio_runtime;

/// Returns `Ok(true)` when the bootstrap itself failed. Its failure has
/// already been reported through the progress sink by then.
pub fn run_install(
    config_path: Option<&Path>,
    target: &TargetArgs,
    download: Option<DownloadArg>,
    format: OutputFormat,
) -> Result<bool> {
    let root = plugin_root(target)?;
    let mut config = load_config(config_path, &root)?;
    if let Some(download) = download {
        config.download = download.into();
    }

    let rt = create_tokio_runtime()?;
    rt.block_on(install(&config, &root, target, format))
}

async fn install(
    config: &BootstrapConfig,
    root: &Path,
    target: &TargetArgs,
    format: OutputFormat,
) -> Result<bool> {
    let tier = resolve_tier(target, config).await?;
    let plan = BootstrapPlan::new(config, root, Platform::current(), tier);
    debug!("Installing {} to {}", plan.artifact, plan.destination.display());

    let result = match format {
        OutputFormat::Text => execute(plan, config, TracingSink).await?,
        OutputFormat::Json => execute(plan, config, JsonLinesSink).await?,
    };

    match result {
        Ok(BootstrapOutcome::Downloaded { path }) => {
            info!("Installed prebuilt module at {}", path.display());
            Ok(false)
        }
        Ok(BootstrapOutcome::Built { path }) => {
            info!("Installed locally built module at {}", path.display());
            Ok(false)
        }
        Err(err) => {
            debug!("Bootstrap failed: {}", err);
            Ok(true)
        }
    }
}

async fn execute<S: ProgressSink>(
    plan: BootstrapPlan,
    config: &BootstrapConfig,
    sink: S,
) -> Result<Result<BootstrapOutcome, BootstrapError>> {
    let runner = TokioProcessRunner;
    let outcome = match config.download {
        DownloadMethod::Http => {
            let fetcher = HttpFetcher::new(config.http_timeout()).into_diagnostic()?;
            BootstrapSequencer::new(plan, runner, fetcher, sink).run().await
        }
        DownloadMethod::Curl | DownloadMethod::None => {
            let fetcher =
                CommandFetcher::new(runner, &config.curl).with_timeout(config.process_timeout());
            BootstrapSequencer::new(plan, runner, fetcher, sink).run().await
        }
    };
    Ok(outcome)
}
