//! Bootstrap stages and how each one's outcome drives the next.

use std::fmt;

use serde::Serialize;

/// A stage of the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Create the destination directory.
    EnsureDir,
    /// Fetch the prebuilt artifact.
    Download,
    /// Build the artifact from source.
    Build,
    /// Move the built artifact to the destination.
    Relocate,
}

/// What the sequence does after a step finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationPolicy {
    /// Run the next step.
    Proceed,
    /// Stop, the artifact is in place.
    Finish,
    /// Run the fallback step instead.
    FallBack,
    /// Stop with an error.
    Abort,
}

impl StepKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::EnsureDir => "mkdir",
            Self::Download => "download",
            Self::Build => "build",
            Self::Relocate => "relocate",
        }
    }

    pub fn policy(self, succeeded: bool) -> ContinuationPolicy {
        match (self, succeeded) {
            (Self::EnsureDir | Self::Build, true) => ContinuationPolicy::Proceed,
            (Self::Download | Self::Relocate, true) => ContinuationPolicy::Finish,
            (Self::Download, false) => ContinuationPolicy::FallBack,
            (Self::EnsureDir | Self::Build | Self::Relocate, false) => ContinuationPolicy::Abort,
        }
    }

    /// Step that runs after this one succeeds.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::EnsureDir => Some(Self::Download),
            Self::Build => Some(Self::Relocate),
            Self::Download | Self::Relocate => None,
        }
    }

    /// Step that runs after this one fails, if it can be recovered from.
    pub fn fallback(self) -> Option<Self> {
        match self {
            Self::Download => Some(Self::Build),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
