//! Error types for the bootstrap.

use std::path::PathBuf;

use diffdirs_process::ProcessStatus;
use thiserror::Error;

use crate::StepKind;
use crate::fetch::FetchError;
use crate::relocate::RelocateError;

/// Errors raised while loading the bootstrap configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is malformed or fails validation.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Fatal outcomes of the bootstrap sequence.
///
/// An unavailable download is not one of them; it only triggers the local
/// build.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The destination directory could not be created.
    #[error("Failed to create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The prebuilt artifact could not be fetched.
    #[error("download unavailable: {reason}")]
    DownloadUnavailable { reason: String },

    /// A process-backed step did not exit successfully.
    #[error("{step} failed ({status})")]
    StepFailed {
        step: StepKind,
        status: ProcessStatus,
        stderr: String,
    },

    /// No built artifact could be moved into place.
    #[error("relocate failed: {0}")]
    Relocate(#[from] RelocateError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The download client could not be set up.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The host version could not be determined.
    #[error("Could not determine host version: {0}")]
    HostVersion(String),
}

impl BootstrapError {
    /// Exit code of the failed process, when there is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::StepFailed {
                status: ProcessStatus::Exited(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }
}
