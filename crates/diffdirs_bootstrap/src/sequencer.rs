//! The fetch-or-build sequence.

use std::path::PathBuf;

use diffdirs_process::{ProcessResult, ProcessRunner};
use tokio::sync::watch;
use tracing::debug;

use crate::fetch::{ArtifactFetcher, FetchOutcome};
use crate::progress::{Level, ProgressEvent, ProgressSink};
use crate::relocate::{RelocateError, relocate_artifact};
use crate::step::{ContinuationPolicy, StepKind};
use crate::{BootstrapError, BootstrapPlan};

/// Where the sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Between steps.
    Running,
    /// Suspended until the step's external work completes.
    AwaitingProcess(StepKind),
    /// The artifact is installed.
    Done,
    /// A fatal step failed.
    Failed,
}

/// How the artifact ended up at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Downloaded { path: PathBuf },
    Built { path: PathBuf },
}

impl BootstrapOutcome {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Downloaded { path } | Self::Built { path } => path,
        }
    }
}

type StepReport = Result<(), BootstrapError>;

/// Drives the bootstrap steps: ensure the destination directory, try the
/// download, and on failure build from source and relocate the result.
///
/// The sequence is a single task. It only suspends while a step awaits its
/// process or transfer; progress reporting never suspends.
pub struct BootstrapSequencer<R, F, S> {
    plan: BootstrapPlan,
    runner: R,
    fetcher: F,
    sink: S,
    state: watch::Sender<SequencerState>,
}

impl<R, F, S> BootstrapSequencer<R, F, S>
where
    R: ProcessRunner,
    F: ArtifactFetcher,
    S: ProgressSink,
{
    pub fn new(plan: BootstrapPlan, runner: R, fetcher: F, sink: S) -> Self {
        let (state, _) = watch::channel(SequencerState::Running);
        Self {
            plan,
            runner,
            fetcher,
            sink,
            state,
        }
    }

    pub fn plan(&self) -> &BootstrapPlan {
        &self.plan
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SequencerState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SequencerState {
        *self.state.borrow()
    }

    /// Run the sequence to completion.
    pub async fn run(&self) -> Result<BootstrapOutcome, BootstrapError> {
        self.set_state(SequencerState::Running);
        let result = self.run_steps().await;
        self.set_state(if result.is_ok() {
            SequencerState::Done
        } else {
            SequencerState::Failed
        });
        result
    }

    async fn run_steps(&self) -> Result<BootstrapOutcome, BootstrapError> {
        let mut step = StepKind::EnsureDir;
        let mut built = false;
        loop {
            let report = self.execute(step).await;
            debug!(step = %step, succeeded = report.is_ok(), "step finished");

            match (step.policy(report.is_ok()), report) {
                (ContinuationPolicy::Finish, _) => break,
                (ContinuationPolicy::Proceed, _) => {
                    built |= step == StepKind::Build;
                    step = match step.successor() {
                        Some(StepKind::Download) if self.plan.skip_download => StepKind::Build,
                        Some(next) => next,
                        None => break,
                    };
                }
                (ContinuationPolicy::FallBack, Err(err)) => {
                    let Some(next) = step.fallback() else {
                        return Err(err);
                    };
                    self.emit(Level::Warn, format!("{err}; building from source instead"));
                    step = next;
                }
                (ContinuationPolicy::Abort, Err(err)) => return Err(err),
                // Failure policies are never chosen for a successful step.
                (ContinuationPolicy::FallBack | ContinuationPolicy::Abort, Ok(())) => break,
            }
        }

        self.emit(Level::Trace, "Done");
        let path = self.plan.destination.clone();
        Ok(if built {
            BootstrapOutcome::Built { path }
        } else {
            BootstrapOutcome::Downloaded { path }
        })
    }

    async fn execute(&self, step: StepKind) -> StepReport {
        match step {
            StepKind::EnsureDir => self.ensure_destination_dir().await,
            StepKind::Download => self.download().await,
            StepKind::Build => self.build().await,
            StepKind::Relocate => self.relocate().await,
        }
    }

    async fn ensure_destination_dir(&self) -> StepReport {
        let dir = self.plan.destination_dir();
        tokio::fs::create_dir_all(dir).await.map_err(|source| {
            let err = BootstrapError::CreateDir {
                path: dir.to_path_buf(),
                source,
            };
            self.emit(Level::Error, err.to_string());
            err
        })
    }

    async fn download(&self) -> StepReport {
        let url = &self.plan.download_url;
        self.emit(Level::Info, format!("Downloading {url}"));

        self.set_state(SequencerState::AwaitingProcess(StepKind::Download));
        let outcome = self.fetcher.fetch(url, &self.plan.destination).await;
        self.set_state(SequencerState::Running);

        match outcome {
            FetchOutcome::Fetched => Ok(()),
            FetchOutcome::Unavailable { reason } => {
                Err(BootstrapError::DownloadUnavailable { reason })
            }
        }
    }

    async fn build(&self) -> StepReport {
        // Only constructed once a build is actually needed.
        let spec = self.plan.build_spec();
        self.emit(Level::Info, format!("Building: {}", spec.display()));

        self.set_state(SequencerState::AwaitingProcess(StepKind::Build));
        let result = self.runner.run(spec).await;
        self.set_state(SequencerState::Running);

        if result.success() {
            Ok(())
        } else {
            Err(self.report_process_failure(StepKind::Build, result))
        }
    }

    async fn relocate(&self) -> StepReport {
        self.set_state(SequencerState::AwaitingProcess(StepKind::Relocate));
        let moved = relocate_artifact(
            &self.plan.build_output_dir,
            &self.plan.build_candidates,
            &self.plan.destination,
        )
        .await;
        self.set_state(SequencerState::Running);

        match moved {
            Ok(source) => {
                self.emit(
                    Level::Info,
                    format!(
                        "Installed {} to {}",
                        source.display(),
                        self.plan.destination.display()
                    ),
                );
                Ok(())
            }
            Err(err) => {
                // Each rejected candidate stands in for the captured stderr.
                let RelocateError::NoCandidate { attempts, .. } = &err;
                for (path, cause) in attempts {
                    self.emit(Level::Warn, format!("{}: {}", path.display(), cause));
                }
                let err = BootstrapError::from(err);
                self.emit(Level::Error, err.to_string());
                Err(err)
            }
        }
    }

    /// Dump the captured output for diagnosis and emit the terminal error.
    /// Empty streams are not dumped.
    fn report_process_failure(&self, step: StepKind, result: ProcessResult) -> BootstrapError {
        if !result.stdout.is_empty() {
            self.emit(Level::Info, result.stdout_lossy());
        }
        let stderr = result.stderr_lossy().into_owned();
        if !stderr.is_empty() {
            self.emit(Level::Warn, stderr.clone());
        }

        let err = BootstrapError::StepFailed {
            step,
            status: result.status,
            stderr,
        };
        self.emit(Level::Error, err.to_string());
        err
    }

    fn emit(&self, level: Level, message: impl Into<String>) {
        self.sink.emit(ProgressEvent::new(level, message));
    }

    fn set_state(&self, state: SequencerState) {
        self.state.send_replace(state);
    }
}
