//! Moving a freshly built library into place.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::fetch::partial_path;

#[derive(Debug, Error)]
pub enum RelocateError {
    /// None of the candidate files could be moved.
    #[error("no built artifact could be moved from {}: {}", .dir.display(), describe(.attempts))]
    NoCandidate {
        dir: PathBuf,
        attempts: Vec<(PathBuf, io::Error)>,
    },
}

fn describe(attempts: &[(PathBuf, io::Error)]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|(path, err)| format!("{}: {}", path.display(), err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Move the first existing candidate in `source_dir` to `dest`.
///
/// Candidates are tried in order and the first successful move wins. Returns
/// the path that was moved.
pub async fn relocate_artifact(
    source_dir: &Path,
    candidates: &[String],
    dest: &Path,
) -> Result<PathBuf, RelocateError> {
    let mut attempts = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let source = source_dir.join(candidate);
        match move_file(&source, dest).await {
            Ok(()) => {
                debug!(from = %source.display(), to = %dest.display(), "relocated artifact");
                return Ok(source);
            }
            Err(err) => {
                debug!(from = %source.display(), error = %err, "candidate not moved");
                attempts.push((source, err));
            }
        }
    }
    Err(RelocateError::NoCandidate {
        dir: source_dir.to_path_buf(),
        attempts,
    })
}

async fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match tokio::fs::rename(source, dest).await {
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            copy_into_place(source, dest).await?;
            tokio::fs::remove_file(source).await
        }
        other => other,
    }
}

/// Copy `source` next to `dest` and rename it over `dest`, so an interrupted
/// copy never leaves a truncated file at `dest`.
async fn copy_into_place(source: &Path, dest: &Path) -> io::Result<()> {
    let partial = partial_path(dest);
    let copied = match tokio::fs::copy(source, &partial).await {
        Ok(_) => tokio::fs::rename(&partial, dest).await,
        Err(err) => Err(err),
    };
    if copied.is_err()
        && let Err(err) = tokio::fs::remove_file(&partial).await
        && err.kind() != io::ErrorKind::NotFound
    {
        debug!(path = %partial.display(), error = %err, "failed to remove partial copy");
    }
    copied
}
