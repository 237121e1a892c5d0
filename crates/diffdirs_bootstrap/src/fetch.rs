//! Downloading prebuilt artifacts.
//!
//! Both fetchers write to a `.part` file next to the destination and rename it
//! into place only after a complete, successful transfer. The destination
//! never holds a truncated module.

use std::ffi::{OsStr, OsString};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use diffdirs_process::{ProcessRunner, ProcessSpec};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Default maximum number of redirects followed by [`HttpFetcher`].
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Error type for HTTP fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed or returned an error status.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Writing the downloaded file failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result of a download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The artifact is now at the destination.
    Fetched,
    /// The artifact could not be fetched. Routine: the caller falls back to
    /// building from source.
    Unavailable { reason: String },
}

/// Downloads one URL to a destination file.
pub trait ArtifactFetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = FetchOutcome> + Send;
}

impl<T: ArtifactFetcher + ?Sized> ArtifactFetcher for &T {
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(url, dest)
    }
}

/// Path of the in-progress download for `dest`.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".part");
    dest.with_file_name(name)
}

async fn discard_partial(partial: &Path) {
    if let Err(err) = tokio::fs::remove_file(partial).await
        && err.kind() != std::io::ErrorKind::NotFound
    {
        debug!(path = %partial.display(), error = %err, "failed to remove partial download");
    }
}

async fn promote_partial(partial: &Path, dest: &Path) -> FetchOutcome {
    match tokio::fs::rename(partial, dest).await {
        Ok(()) => FetchOutcome::Fetched,
        Err(err) => {
            discard_partial(partial).await;
            FetchOutcome::Unavailable {
                reason: format!("failed to move download into place: {err}"),
            }
        }
    }
}

/// Fetches with an external `curl` run through a [`ProcessRunner`].
///
/// `curl` is invoked with `--fail --location`, so redirects are followed and
/// HTTP errors are a non-zero exit rather than a saved error page.
#[derive(Debug, Clone)]
pub struct CommandFetcher<R> {
    runner: R,
    curl: OsString,
    timeout: Option<Duration>,
}

impl<R: ProcessRunner> CommandFetcher<R> {
    pub fn new(runner: R, curl: impl AsRef<OsStr>) -> Self {
        Self {
            runner,
            curl: curl.as_ref().to_owned(),
            timeout: None,
        }
    }

    /// Kill `curl` if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The `curl` invocation for one download.
    pub fn spec(&self, url: &str, output: &Path) -> ProcessSpec {
        let spec = ProcessSpec::new(&self.curl)
            .args(["--fail", "--location", "--silent", "--show-error", "--output"])
            .arg(output)
            .arg(url);
        match self.timeout {
            Some(timeout) => spec.timeout(timeout),
            None => spec,
        }
    }
}

impl<R: ProcessRunner> ArtifactFetcher for CommandFetcher<R> {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome {
        let partial = partial_path(dest);
        let result = self.runner.run(self.spec(url, &partial)).await;

        if result.success() {
            return promote_partial(&partial, dest).await;
        }

        discard_partial(&partial).await;
        let stderr = result.stderr_lossy();
        let detail = stderr.trim();
        FetchOutcome::Unavailable {
            reason: if detail.is_empty() {
                format!("curl {}", result.status)
            } else {
                format!("curl {}: {}", result.status, detail)
            },
        }
    }
}

/// Fetches with the built-in HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS))
            .user_agent(concat!("diffdirs-bootstrap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn download_to(&self, url: &str, partial: &Path) -> Result<u64, FetchError> {
        let url = url::Url::parse(url)?;
        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(partial).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> FetchOutcome {
        let partial = partial_path(dest);
        match self.download_to(url, &partial).await {
            Ok(bytes) => {
                debug!(url, bytes, "downloaded artifact");
                promote_partial(&partial, dest).await
            }
            Err(err) => {
                discard_partial(&partial).await;
                FetchOutcome::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }
}
