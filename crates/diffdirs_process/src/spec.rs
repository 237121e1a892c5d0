//! Description of a single external process invocation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Everything needed to start one external process.
///
/// A spec is assembled with the consuming builder methods and is not
/// modified afterwards; [`crate::ProcessRunner::run`] takes it by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
    timeout: Option<Duration>,
}

impl ProcessSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            timeout: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append several arguments, keeping their order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Run the process in `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Override one environment variable for the child.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_owned(), value.as_ref().to_owned()));
        self
    }

    /// Kill the child if it has not exited after `timeout`.
    ///
    /// Without this the runner waits for as long as the child runs.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Render the invocation as a shell-like command line for messages.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| quote(&part.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the tokio command with both output streams piped.
    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

fn quote(part: &str) -> String {
    if !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        return part.to_string();
    }
    format!("'{}'", part.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_keeps_argument_order() {
        let spec = ProcessSpec::new("cargo")
            .arg("build")
            .args(["--release", "--locked"])
            .arg("--features")
            .arg("host-v1");

        let args: Vec<_> = spec
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["build", "--release", "--locked", "--features", "host-v1"]
        );
    }

    #[test]
    fn defaults_have_no_dir_env_or_timeout() {
        let spec = ProcessSpec::new("true");

        assert!(spec.get_current_dir().is_none());
        assert!(spec.get_envs().is_empty());
        assert!(spec.get_timeout().is_none());
    }

    #[test]
    fn records_dir_env_and_timeout() {
        let spec = ProcessSpec::new("make")
            .current_dir("/tmp/plugin")
            .env("RUSTFLAGS", "-C opt-level=3")
            .timeout(Duration::from_secs(5));

        assert_eq!(spec.get_current_dir(), Some(Path::new("/tmp/plugin")));
        assert_eq!(
            spec.get_envs(),
            &[(OsString::from("RUSTFLAGS"), OsString::from("-C opt-level=3"))]
        );
        assert_eq!(spec.get_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = ProcessSpec::new("curl")
            .args(["--output", "/tmp/my dir/a.so", "it's", ""]);

        assert_eq!(
            spec.display(),
            r"curl --output '/tmp/my dir/a.so' 'it'\''s' ''"
        );
    }
}
