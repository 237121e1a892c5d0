//! # diffdirs_bootstrap
//!
//! Makes the diffdirs native module available to the editor.
//!
//! The bootstrap first tries to download a prebuilt artifact matching the
//! host (OS, CPU architecture and editor version tier) and falls back to a
//! local `cargo build` when the download is unavailable. Every transition is
//! reported to the host as a [`ProgressEvent`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use diffdirs_bootstrap::{
//!     BootstrapConfig, BootstrapPlan, BootstrapSequencer, CommandFetcher, Platform,
//!     TracingSink, VersionTier,
//! };
//! use diffdirs_process::TokioProcessRunner;
//!
//! let config = BootstrapConfig::default();
//! let plan = BootstrapPlan::new(&config, ".", Platform::current(), VersionTier::new("v0_10")?);
//! let fetcher = CommandFetcher::new(TokioProcessRunner, &config.curl);
//! let sequencer = BootstrapSequencer::new(plan, TokioProcessRunner, fetcher, TracingSink);
//! sequencer.run().await?;
//! ```

pub mod artifact;
mod config;
mod error;
pub mod fetch;
pub mod host;
mod plan;
pub mod platform;
pub mod progress;
pub mod relocate;
mod sequencer;
pub mod step;
pub mod tier;

pub use artifact::ArtifactId;
pub use config::{BootstrapConfig, CONFIG_FILE_NAME, DownloadMethod};
pub use error::{BootstrapError, ConfigError};
pub use fetch::{ArtifactFetcher, CommandFetcher, FetchError, FetchOutcome, HttpFetcher};
pub use plan::BootstrapPlan;
pub use platform::Platform;
pub use progress::{ChannelSink, Level, ProgressEvent, ProgressSink, RecordingSink, TracingSink};
pub use relocate::{RelocateError, relocate_artifact};
pub use sequencer::{BootstrapOutcome, BootstrapSequencer, SequencerState};
pub use step::{ContinuationPolicy, StepKind};
pub use tier::{InvalidTier, VersionTier};
