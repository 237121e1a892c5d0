//! Integration tests for CLI behavior

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use diffdirs_bootstrap::{CONFIG_FILE_NAME, Platform};
use predicates::prelude::*;

fn bootstrap_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_diffdirs-bootstrap"))
}

mod help_command {
    use super::*;

    #[test]
    fn shows_help_with_flag() {
        bootstrap_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("install"));
    }

    #[test]
    fn shows_version_with_flag() {
        bootstrap_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn rejects_tier_together_with_host_version() {
        bootstrap_cmd()
            .args(["info", "--tier", "v1", "--host-version", "1.0.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}

mod tier_argument {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("")]
    #[case::path_traversal("../../v1")]
    #[case::url_fragment("v1?x=y")]
    fn rejects_tiers_unfit_for_artifact_names(#[case] tier: &str) {
        bootstrap_cmd()
            .args(["info", "--tier", tier])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid version tier"));
    }
}

mod info_command {
    use super::*;

    #[test]
    fn prints_artifact_for_explicit_tier() {
        let dir = TempDir::new().unwrap();
        let expected = format!("diffdirs-{}-v1.", Platform::current());

        bootstrap_cmd()
            .arg("info")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "v1"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected))
            .stdout(predicate::str::contains("host-v1"));
    }

    #[test]
    fn derives_tier_from_host_version() {
        let dir = TempDir::new().unwrap();

        let output = bootstrap_cmd()
            .arg("info")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--host-version", "v0.10.2", "--format", "json"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(info["tier"], "v0_10");
        assert_eq!(info["feature"], "host-v0-10");
        assert_eq!(info["download"], "curl");
    }

    #[test]
    fn reads_config_from_plugin_root() {
        let dir = TempDir::new().unwrap();
        dir.child(CONFIG_FILE_NAME)
            .write_str(r#"{ "release_url": "https://mirror.example.com/v9", "download": "none" }"#)
            .unwrap();

        bootstrap_cmd()
            .arg("info")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "nightly"])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://mirror.example.com/v9/diffdirs-"))
            .stdout(predicate::str::contains("disabled"));
    }

    #[test]
    fn invalid_config_exits_with_code_2() {
        let dir = TempDir::new().unwrap();
        dir.child(CONFIG_FILE_NAME)
            .write_str(r#"{ "download": "ftp" }"#)
            .unwrap();

        bootstrap_cmd()
            .arg("info")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "v1"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Config validation failed"));
    }
}

mod install_command {
    use super::*;

    #[test]
    fn failed_build_exits_with_code_1_and_reports_json_error() {
        let dir = TempDir::new().unwrap();
        dir.child(CONFIG_FILE_NAME)
            .write_str(r#"{ "download": "none", "cargo": "/nonexistent/diffdirs-cargo" }"#)
            .unwrap();

        let output = bootstrap_cmd()
            .arg("install")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "v1", "--format", "json"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let events: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let errors: Vec<_> = events.iter().filter(|e| e["level"] == "error").collect();
        assert_eq!(errors.len(), 1);
        assert!(
            errors[0]["message"]
                .as_str()
                .unwrap()
                .contains("failed to spawn")
        );
        assert!(events.iter().any(|e| e["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("Building: "))));
        dir.child("lua").assert(predicate::path::is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn builds_from_source_when_download_is_disabled() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cargo = dir.child("fake-cargo");
        cargo
            .write_str(
                "#!/bin/sh\nmkdir -p target/release && printf built > target/release/libdiffdirs.so\n",
            )
            .unwrap();
        std::fs::set_permissions(cargo.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        bootstrap_cmd()
            .arg("install")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "v1", "--download", "none"])
            .arg("--config")
            .arg(write_config(&dir, cargo.path()))
            .assert()
            .success()
            .stderr(predicate::str::contains("Installed"));

        dir.child("lua/diffdirs.so").assert("built");
    }

    #[cfg(unix)]
    #[test]
    fn verbose_install_reports_completion() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cargo = dir.child("fake-cargo");
        cargo
            .write_str(
                "#!/bin/sh\nmkdir -p target/release && printf built > target/release/libdiffdirs.so\n",
            )
            .unwrap();
        std::fs::set_permissions(cargo.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        bootstrap_cmd()
            .arg("--verbose")
            .arg("install")
            .arg("--plugin-root")
            .arg(dir.path())
            .args(["--tier", "v1", "--download", "none"])
            .arg("--config")
            .arg(write_config(&dir, cargo.path()))
            .assert()
            .success()
            .stderr(predicate::str::contains("Done"));
    }

    #[cfg(unix)]
    fn write_config(dir: &TempDir, cargo: &std::path::Path) -> std::path::PathBuf {
        let config = dir.child("bootstrap.json");
        config
            .write_str(&serde_json::json!({ "cargo": cargo }).to_string())
            .unwrap();
        config.path().to_path_buf()
    }
}
