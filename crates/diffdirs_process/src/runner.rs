//! Process execution on the tokio runtime.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{ProcessResult, ProcessStatus, ProcessSpec};

/// Size of each read from a child pipe.
const READ_CHUNK: usize = 8 * 1024;

/// How long the pipes may stay open past a timeout. Grandchildren that
/// inherited them are not killed with the child.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Runs a [`ProcessSpec`] to completion.
///
/// Implementations never fail: spawn errors, stream errors and abnormal
/// termination are all reported through [`ProcessResult`], and deciding
/// what they mean is left to the caller.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, spec: ProcessSpec) -> impl Future<Output = ProcessResult> + Send;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, spec: ProcessSpec) -> impl Future<Output = ProcessResult> + Send {
        (**self).run(spec)
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for std::sync::Arc<T> {
    fn run(&self, spec: ProcessSpec) -> impl Future<Output = ProcessResult> + Send {
        (**self).run(spec)
    }
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: ProcessSpec) -> ProcessResult {
        run_process(spec).await
    }
}

/// Spawn the process described by `spec` and wait for it to finish.
///
/// stdout and stderr are drained concurrently with the wait, so a child that
/// writes more than the OS pipe buffer holds never blocks on a full pipe.
/// The result is only produced once the child has exited *and* both streams
/// have reached end of file. With a timeout, the streams are read for at most
/// the timeout plus a short grace period, so a run is bounded even when a
/// descendant of the child keeps a pipe open.
pub async fn run_process(spec: ProcessSpec) -> ProcessResult {
    let command_line = spec.display();
    let mut child = match spec.to_command().spawn() {
        Ok(child) => child,
        Err(err) => {
            debug!(command = %command_line, error = %err, "failed to spawn process");
            return ProcessResult::spawn_failed(&spec.program().to_string_lossy(), &err);
        }
    };
    debug!(command = %command_line, pid = ?child.id(), "spawned process");

    let drain_deadline = spec
        .get_timeout()
        .map(|limit| Instant::now() + limit + DRAIN_GRACE);
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (stdout, stderr, (status, wait_error)) = tokio::join!(
        drain(stdout, "stdout", drain_deadline),
        drain(stderr, "stderr", drain_deadline),
        wait_for_exit(&mut child, spec.get_timeout()),
    );

    let mut stderr_bytes = stderr.bytes;
    for message in [stdout.error, stderr.error, wait_error].into_iter().flatten() {
        stderr_bytes.extend_from_slice(message.as_bytes());
    }

    debug!(
        command = %command_line,
        %status,
        stdout_len = stdout.bytes.len(),
        stderr_len = stderr_bytes.len(),
        "process finished"
    );
    ProcessResult::new(status, stdout.bytes, stderr_bytes)
}

struct Drained {
    bytes: Vec<u8>,
    error: Option<String>,
}

/// Read a pipe until end of file, or until `deadline` passes.
///
/// A read error or an expired deadline ends the drain and is returned as
/// text; it is diagnostic only and does not affect the process status.
async fn drain<R>(pipe: Option<R>, stream: &'static str, deadline: Option<Instant>) -> Drained
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    let Some(pipe) = pipe else {
        return Drained { bytes, error: None };
    };

    let read = read_to_end(pipe, &mut bytes, stream);
    let error = match deadline {
        None => read.await,
        Some(deadline) => match tokio::time::timeout_at(deadline, read).await {
            Ok(error) => error,
            Err(_) => {
                warn!(stream, "child output still open after timeout, truncating");
                Some(format!("{stream} truncated: still open after timeout\n"))
            }
        },
    };
    Drained { bytes, error }
}

async fn read_to_end<R>(mut pipe: R, bytes: &mut Vec<u8>, stream: &'static str) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => return None,
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(stream, error = %err, "failed to read child output");
                return Some(format!("{stream} read error: {err}\n"));
            }
        }
    }
}

async fn wait_for_exit(
    child: &mut Child,
    timeout: Option<Duration>,
) -> (ProcessStatus, Option<String>) {
    let waited = match timeout {
        None => child.wait().await,
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited,
            Err(_) => {
                warn!(timeout = ?limit, pid = ?child.id(), "process timed out, killing it");
                if let Err(err) = child.kill().await {
                    warn!(error = %err, "failed to kill timed out process");
                }
                return (
                    ProcessStatus::TimedOut,
                    Some(format!("process timed out after {limit:?}\n")),
                );
            }
        },
    };

    match waited {
        Ok(status) => (ProcessStatus::from_exit_status(status), None),
        Err(err) => (
            ProcessStatus::WaitFailed,
            Some(format!("failed to wait for process: {err}\n")),
        ),
    }
}
