//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use diffdirs_bootstrap::{DownloadMethod, VersionTier};

/// diffdirs-bootstrap - install the diffdirs native module
#[derive(Parser)]
#[command(name = "diffdirs-bootstrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the prebuilt module, or build it from source
    Install {
        #[command(flatten)]
        target: TargetArgs,

        /// How to fetch the prebuilt module (overrides the config file)
        #[arg(long, value_enum)]
        download: Option<DownloadArg>,

        /// Progress output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the artifact that would be installed
    Info {
        #[command(flatten)]
        target: TargetArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args, Clone)]
pub struct TargetArgs {
    /// Plugin root directory
    #[arg(long, default_value = ".")]
    pub plugin_root: PathBuf,

    /// Host editor version, e.g. "0.10.2" (queried from the host when omitted)
    #[arg(long, conflicts_with = "tier")]
    pub host_version: Option<String>,

    /// Version tier to install, e.g. "v0_10" or "nightly"
    #[arg(long)]
    pub tier: Option<VersionTier>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable log lines on stderr
    Text,
    /// One JSON event per line on stdout
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DownloadArg {
    Curl,
    Http,
    None,
}

impl From<DownloadArg> for DownloadMethod {
    fn from(value: DownloadArg) -> Self {
        match value {
            DownloadArg::Curl => DownloadMethod::Curl,
            DownloadArg::Http => DownloadMethod::Http,
            DownloadArg::None => DownloadMethod::None,
        }
    }
}
