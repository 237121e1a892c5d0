//! Querying the host editor for its version.

use std::ffi::OsStr;
use std::time::Duration;

use diffdirs_process::{ProcessRunner, ProcessSpec};
use semver::Version;

use crate::BootstrapError;
use crate::tier::parse_host_version;

/// Run `<host> --version` and parse the version from its first line
/// (`NVIM v0.10.2`).
pub async fn detect_host_version<R: ProcessRunner>(
    runner: &R,
    host: impl AsRef<OsStr>,
    timeout: Option<Duration>,
) -> Result<Version, BootstrapError> {
    let mut spec = ProcessSpec::new(host.as_ref()).arg("--version");
    if let Some(timeout) = timeout {
        spec = spec.timeout(timeout);
    }
    let display = spec.display();
    let result = runner.run(spec).await;

    if !result.success() {
        return Err(BootstrapError::HostVersion(format!(
            "`{}` {}: {}",
            display,
            result.status,
            result.stderr_lossy().trim()
        )));
    }
    parse_version_banner(&result.stdout_lossy())
        .ok_or_else(|| BootstrapError::HostVersion(format!("no version in output of `{display}`")))
}

/// Extract the version from a `--version` banner.
pub fn parse_version_banner(output: &str) -> Option<Version> {
    let first_line = output.lines().next()?;
    first_line
        .split_whitespace()
        .find_map(|word| parse_host_version(word).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diffdirs_process::{ProcessResult, ProcessStatus};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Banner(ProcessStatus, &'static str);

    impl ProcessRunner for Banner {
        async fn run(&self, _spec: ProcessSpec) -> ProcessResult {
            ProcessResult::new(self.0, self.1.as_bytes().to_vec(), b"boom".to_vec())
        }
    }

    #[rstest]
    #[case::release("NVIM v0.10.2\nBuild type: Release\n", "0.10.2")]
    #[case::nightly("NVIM v0.11.0-dev-1234+gdeadbeef\nBuild type: RelWithDebInfo\n", "0.11.0-dev-1234+gdeadbeef")]
    #[case::bare("1.0.0", "1.0.0")]
    fn parses_banners(#[case] banner: &str, #[case] expected: &str) {
        assert_eq!(
            parse_version_banner(banner),
            Some(Version::parse(expected).unwrap())
        );
    }

    #[test]
    fn ignores_versions_after_first_line() {
        assert_eq!(parse_version_banner("NVIM\nv0.10.0\n"), None);
    }

    #[tokio::test]
    async fn detects_version_from_runner() {
        let runner = Banner(ProcessStatus::Exited(0), "NVIM v0.9.5\n");

        let version = detect_host_version(&runner, "nvim", None).await.unwrap();

        assert_eq!(version, Version::new(0, 9, 5));
    }

    #[tokio::test]
    async fn failing_host_is_an_error() {
        let runner = Banner(ProcessStatus::SpawnFailed, "");

        let err = detect_host_version(&runner, "nvim", None).await.unwrap_err();

        assert!(err.to_string().contains("failed to spawn"), "{err}");
    }
}
