//! Subcommand implementations

pub mod info;
pub mod install;

use std::path::{Path, PathBuf};

use diffdirs_bootstrap::tier::parse_host_version;
use diffdirs_bootstrap::{BootstrapConfig, VersionTier, host::detect_host_version};
use diffdirs_process::TokioProcessRunner;
use miette::{IntoDiagnostic, Result};
use tracing::{debug, info};

use crate::cli::TargetArgs;

/// Absolute plugin root for the invocation.
pub fn plugin_root(target: &TargetArgs) -> Result<PathBuf> {
    std::path::absolute(&target.plugin_root).into_diagnostic()
}

/// Load the configuration from `--config`, or from the plugin root when a
/// config file is present there. Falls back to the defaults.
pub fn load_config(config_path: Option<&Path>, plugin_root: &Path) -> Result<BootstrapConfig> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => BootstrapConfig::discover(plugin_root),
    };

    match path {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            BootstrapConfig::from_file(&path).into_diagnostic()
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(BootstrapConfig::default())
        }
    }
}

/// Tier from `--tier`, else from `--host-version`, else from the host itself.
pub async fn resolve_tier(target: &TargetArgs, config: &BootstrapConfig) -> Result<VersionTier> {
    if let Some(tier) = &target.tier {
        return Ok(tier.clone());
    }

    let version = match &target.host_version {
        Some(version) => parse_host_version(version).into_diagnostic()?,
        None => {
            let version =
                detect_host_version(&TokioProcessRunner, &config.host, config.process_timeout())
                    .await
                    .into_diagnostic()?;
            info!("Detected {} {}", config.host.display(), version);
            version
        }
    };
    Ok(VersionTier::from_host_version(&version))
}
