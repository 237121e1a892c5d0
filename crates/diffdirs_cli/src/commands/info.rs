//! `info` subcommand

use std::path::Path;

use diffdirs_bootstrap::{BootstrapPlan, Platform};
use miette::{IntoDiagnostic, Result};

use crate::cli::{OutputFormat, TargetArgs};
use crate::commands::{load_config, plugin_root, resolve_tier};
use crate::utils::create_tokio_runtime;

pub fn run_info(config_path: Option<&Path>, target: &TargetArgs, format: OutputFormat) -> Result<()> {
    let root = plugin_root(target)?;
    let config = load_config(config_path, &root)?;

    let rt = create_tokio_runtime()?;
    let tier = rt.block_on(resolve_tier(target, &config))?;
    let plan = BootstrapPlan::new(&config, &root, Platform::current(), tier);

    match format {
        OutputFormat::Text => {
            println!("platform:    {}", plan.artifact.platform());
            println!("tier:        {}", plan.artifact.tier());
            println!("feature:     {}", plan.artifact.tier().feature_flag());
            println!("artifact:    {}", plan.artifact);
            println!("url:         {}", plan.download_url);
            println!("destination: {}", plan.destination.display());
            println!(
                "download:    {}",
                if plan.skip_download { "disabled" } else { "enabled" }
            );
        }
        OutputFormat::Json => {
            let info = serde_json::json!({
                "platform": plan.artifact.platform().to_string(),
                "tier": plan.artifact.tier().as_str(),
                "feature": plan.artifact.tier().feature_flag(),
                "artifact": plan.artifact.file_name(),
                "url": plan.download_url,
                "destination": plan.destination,
                "download": config.download,
            });
            let output = serde_json::to_string_pretty(&info).into_diagnostic()?;
            println!("{}", output);
        }
    }
    Ok(())
}
