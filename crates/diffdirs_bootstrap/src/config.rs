//! Bootstrap configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// File looked up in the plugin root by [`BootstrapConfig::discover`].
pub const CONFIG_FILE_NAME: &str = ".diffdirs-bootstrap.json";

const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/bootstrap.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// How prebuilt artifacts are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMethod {
    /// Run `curl` as an external process.
    #[default]
    Curl,
    /// Use the built-in HTTP client.
    Http,
    /// Never download, always build from source.
    None,
}

/// Configuration for the bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Prefix of release asset names.
    pub artifact_prefix: String,

    /// Name of the `cdylib` crate built by the fallback.
    pub crate_name: String,

    /// Versioned release directory; the asset name is appended to it.
    pub release_url: String,

    /// Install directory, relative to the plugin root.
    pub destination: PathBuf,

    pub download: DownloadMethod,

    /// Path to `cargo`.
    pub cargo: PathBuf,

    /// Path to `curl`.
    pub curl: PathBuf,

    /// Host editor executable queried for its version.
    pub host: PathBuf,

    /// Kill external processes after this many seconds. No limit when unset.
    pub process_timeout_secs: Option<u64>,

    /// Timeout for the built-in HTTP client.
    pub http_timeout_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            artifact_prefix: "diffdirs".to_string(),
            crate_name: "diffdirs".to_string(),
            release_url: "https://github.com/diffdirs/diffdirs.nvim/releases/download/v0.1.0"
                .to_string(),
            destination: PathBuf::from("lua"),
            download: DownloadMethod::Curl,
            cargo: PathBuf::from("cargo"),
            curl: PathBuf::from("curl"),
            host: PathBuf::from("nvim"),
            process_timeout_secs: None,
            http_timeout_secs: 60,
        }
    }
}

impl BootstrapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parses configuration from JSON with schema validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::invalid(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("embedded schema is not JSON: {e}"))?;
                Validator::new(&schema_json).map_err(|e| format!("embedded schema: {e}"))
            })
            .as_ref()
            .map_err(|e| ConfigError::invalid(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(ConfigError::invalid(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        let config: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::invalid(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Finds the configuration file in `plugin_root`, if present.
    pub fn discover(plugin_root: impl AsRef<Path>) -> Option<PathBuf> {
        let candidate = plugin_root.as_ref().join(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Checks constraints the schema cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.release_url).map_err(|e| {
            ConfigError::invalid(format!("release_url {:?}: {}", self.release_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(format!(
                "release_url must use http or https, got {:?}",
                url.scheme()
            )));
        }
        Ok(())
    }

    pub fn process_timeout(&self) -> Option<Duration> {
        self.process_timeout_secs.map(Duration::from_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn empty_object_yields_defaults() {
        let config = BootstrapConfig::from_json("{}").unwrap();

        assert_eq!(config, BootstrapConfig::default());
        assert_eq!(config.download, DownloadMethod::Curl);
        assert!(config.process_timeout().is_none());
    }

    #[test]
    fn parses_all_fields() {
        let json = r#"{
            "artifact_prefix": "mymod",
            "crate_name": "my-mod",
            "release_url": "http://localhost:8080/releases/v2",
            "destination": "lib/native",
            "download": "http",
            "cargo": "/opt/rust/bin/cargo",
            "curl": "/usr/bin/curl",
            "host": "/usr/local/bin/nvim",
            "process_timeout_secs": 600,
            "http_timeout_secs": 5
        }"#;

        let config = BootstrapConfig::from_json(json).unwrap();

        assert_eq!(config.artifact_prefix, "mymod");
        assert_eq!(config.crate_name, "my-mod");
        assert_eq!(config.destination, PathBuf::from("lib/native"));
        assert_eq!(config.download, DownloadMethod::Http);
        assert_eq!(config.cargo, PathBuf::from("/opt/rust/bin/cargo"));
        assert_eq!(config.process_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    #[case::unknown_property(r#"{ "destinaton": "lua" }"#, "Config validation failed")]
    #[case::type_mismatch(r#"{ "http_timeout_secs": "soon" }"#, "Config validation failed")]
    #[case::invalid_enum_value(r#"{ "download": "ftp" }"#, "Config validation failed")]
    #[case::zero_timeout(r#"{ "process_timeout_secs": 0 }"#, "Config validation failed")]
    #[case::not_json("{ nope", "Invalid JSON")]
    #[case::bad_url(r#"{ "release_url": "not a url" }"#, "release_url")]
    #[case::bad_scheme(r#"{ "release_url": "file:///tmp/releases" }"#, "http or https")]
    fn rejects_invalid_config(#[case] json: &str, #[case] expected_error_part: &str) {
        let result = BootstrapConfig::from_json(json);
        assert!(result.is_err(), "Expected error for JSON: {}", json);
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains(expected_error_part),
            "Error message '{}' should contain '{}'",
            err,
            expected_error_part
        );
    }

    #[test]
    fn discovers_config_in_plugin_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BootstrapConfig::discover(dir.path()).is_none());

        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "download": "none" }"#).unwrap();

        assert_eq!(BootstrapConfig::discover(dir.path()), Some(path.clone()));
        let config = BootstrapConfig::from_file(&path).unwrap();
        assert_eq!(config.download, DownloadMethod::None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = BootstrapConfig::from_file(dir.path().join("absent.json"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
