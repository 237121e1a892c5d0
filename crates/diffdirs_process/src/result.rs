//! Outcome of a finished process run.

use std::borrow::Cow;
use std::fmt;

/// How a process run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The process exited normally with this code.
    Exited(i32),
    /// The process was terminated by a signal (unix only).
    Signaled(Option<i32>),
    /// The process was killed after exceeding its timeout.
    TimedOut,
    /// The process could not be started at all.
    SpawnFailed,
    /// The process started but its exit status could not be collected.
    WaitFailed,
}

impl ProcessStatus {
    pub(crate) fn from_exit_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Exited(code),
            None => Self::Signaled(signal_of(status)),
        }
    }
}

#[cfg(unix)]
fn signal_of(status: std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: std::process::ExitStatus) -> Option<i32> {
    None
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled(Some(signal)) => write!(f, "terminated by signal {signal}"),
            Self::Signaled(None) => write!(f, "terminated by signal"),
            Self::TimedOut => write!(f, "timed out"),
            Self::SpawnFailed => write!(f, "failed to spawn"),
            Self::WaitFailed => write!(f, "exit status unavailable"),
        }
    }
}

/// Status and captured output of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub status: ProcessStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    pub fn new(status: ProcessStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            status,
            stdout,
            stderr,
        }
    }

    /// Result for a process that could not be started.
    pub fn spawn_failed(program: &str, error: &std::io::Error) -> Self {
        Self::new(
            ProcessStatus::SpawnFailed,
            Vec::new(),
            format!("failed to spawn {program}: {error}\n").into_bytes(),
        )
    }

    /// The exit code, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            ProcessStatus::Exited(code) => Some(code),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.status == ProcessStatus::Exited(0)
    }

    pub fn spawned(&self) -> bool {
        self.status != ProcessStatus::SpawnFailed
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
