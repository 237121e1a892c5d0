//! # diffdirs_process
//!
//! Runs one external process to completion and hands back everything it
//! produced: the exit status plus the complete stdout and stderr bytes.
//!
//! The call site reads like a single blocking call, but the work is done on
//! the async runtime: the child's two pipes are drained concurrently with the
//! wait for its exit, and the calling task is suspended (not a thread) until
//! all three have finished.
//!
//! ## Example
//!
//! ```rust,ignore
//! use diffdirs_process::{ProcessRunner, ProcessSpec, TokioProcessRunner};
//!
//! let spec = ProcessSpec::new("cargo").args(["build", "--release"]);
//! let result = TokioProcessRunner.run(spec).await;
//! if !result.success() {
//!     eprintln!("{}", result.stderr_lossy());
//! }
//! ```

mod result;
mod runner;
mod spec;

pub use result::{ProcessResult, ProcessStatus};
pub use runner::{ProcessRunner, TokioProcessRunner, run_process};
pub use spec::ProcessSpec;
