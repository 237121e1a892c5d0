//! Concrete paths and commands for one bootstrap run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use diffdirs_process::ProcessSpec;

use crate::{ArtifactId, BootstrapConfig, DownloadMethod, Platform, VersionTier};

/// Everything the sequencer needs, resolved from the configuration and the
/// detected host facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub plugin_root: PathBuf,
    pub artifact: ArtifactId,
    pub download_url: String,
    /// Final path of the installed module.
    pub destination: PathBuf,
    /// Directory `cargo build --release` writes the library to.
    pub build_output_dir: PathBuf,
    pub build_candidates: Vec<String>,
    pub cargo: PathBuf,
    pub process_timeout: Option<Duration>,
    pub skip_download: bool,
}

impl BootstrapPlan {
    pub fn new(
        config: &BootstrapConfig,
        plugin_root: impl Into<PathBuf>,
        platform: Platform,
        tier: VersionTier,
    ) -> Self {
        let plugin_root = plugin_root.into();
        let module_name = format!(
            "{}.{}",
            config.crate_name.replace('-', "_"),
            platform.module_extension()
        );
        let destination = plugin_root.join(&config.destination).join(module_name);
        let build_candidates = platform.built_library_candidates(&config.crate_name);
        let artifact = ArtifactId::new(&config.artifact_prefix, platform, tier);

        Self {
            download_url: artifact.download_url(&config.release_url),
            artifact,
            destination,
            build_output_dir: plugin_root.join("target").join("release"),
            build_candidates,
            cargo: config.cargo.clone(),
            process_timeout: config.process_timeout(),
            skip_download: config.download == DownloadMethod::None,
            plugin_root,
        }
    }

    /// Directory holding the installed module.
    pub fn destination_dir(&self) -> &Path {
        self.destination.parent().unwrap_or(&self.plugin_root)
    }

    /// The locked release build for the detected tier, run in the plugin root.
    pub fn build_spec(&self) -> ProcessSpec {
        let spec = ProcessSpec::new(&self.cargo)
            .args(["build", "--release", "--locked", "--features"])
            .arg(self.artifact.tier().feature_flag())
            .current_dir(&self.plugin_root);
        match self.process_timeout {
            Some(timeout) => spec.timeout(timeout),
            None => spec,
        }
    }
}
