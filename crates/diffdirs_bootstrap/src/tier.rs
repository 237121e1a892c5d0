//! Host version tiers.
//!
//! Artifacts are published per coarse compatibility bucket rather than per
//! exact editor release. Development builds share one `nightly` bucket,
//! `0.x` releases get one bucket per minor version (their API changes
//! between minors), and stable releases get one bucket per major version.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::Serialize;
use thiserror::Error;

/// An explicitly given tier name that cannot appear in an artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version tier {0:?}: expected lower-case letters, digits and underscores")]
pub struct InvalidTier(pub String);

/// Compatibility bucket for the host editor version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersionTier(String);

impl VersionTier {
    /// Accepts a tier name such as `v1`, `v0_10` or `nightly`,
    /// case-insensitively. The name ends up in file names, URLs and cargo
    /// feature names, so only `[a-z0-9_]` is allowed.
    pub fn new(name: impl AsRef<str>) -> Result<Self, InvalidTier> {
        let name = name.as_ref().trim().to_lowercase();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if valid {
            Ok(Self(name))
        } else {
            Err(InvalidTier(name))
        }
    }

    pub fn nightly() -> Self {
        Self("nightly".to_string())
    }

    /// Map a host version to its tier.
    pub fn from_host_version(version: &Version) -> Self {
        if !version.pre.is_empty() {
            Self::nightly()
        } else if version.major == 0 {
            Self(format!("v0_{}", version.minor))
        } else {
            Self(format!("v{}", version.major))
        }
    }

    /// Parse a version string as printed by the host (`v0.10.2`,
    /// `0.11.0-dev-1234+gdeadbeef`) and map it to its tier.
    pub fn from_host_version_str(version: &str) -> Result<Self, semver::Error> {
        parse_host_version(version).map(|v| Self::from_host_version(&v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cargo feature that selects the host bindings for this tier.
    pub fn feature_flag(&self) -> String {
        format!("host-{}", self.0.replace('_', "-"))
    }
}

/// Parse a host version string, tolerating a leading `v`.
pub fn parse_host_version(version: &str) -> Result<Version, semver::Error> {
    let trimmed = version.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed))
}

impl fmt::Display for VersionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionTier {
    type Err = InvalidTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::stable_major("1.2.3", "v1")]
    #[case::stable_major_two("2.0.0", "v2")]
    #[case::zero_minor("0.10.2", "v0_10")]
    #[case::leading_v("v0.9.5", "v0_9")]
    #[case::dev_build("0.11.0-dev-1234+gdeadbeef", "nightly")]
    #[case::whitespace(" v0.10.0\n", "v0_10")]
    fn maps_host_versions(#[case] version: &str, #[case] tier: &str) {
        let resolved = VersionTier::from_host_version_str(version).unwrap();

        assert_eq!(resolved.as_str(), tier);
    }

    #[test]
    fn rejects_unparseable_versions() {
        assert!(VersionTier::from_host_version_str("NVIM").is_err());
    }

    #[rstest]
    #[case("v1", "host-v1")]
    #[case("v0_10", "host-v0-10")]
    #[case("nightly", "host-nightly")]
    fn feature_flag_uses_dashes(#[case] tier: &str, #[case] feature: &str) {
        assert_eq!(VersionTier::new(tier).unwrap().feature_flag(), feature);
    }

    #[test]
    fn explicit_tiers_are_lowercased() {
        let tier: VersionTier = "V1".parse().unwrap();

        assert_eq!(tier.to_string(), "v1");
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("  ")]
    #[case::path_traversal("../v1")]
    #[case::slash("v1/x")]
    #[case::dash("v0-10")]
    #[case::dot("v0.10")]
    fn rejects_tiers_unfit_for_artifact_names(#[case] tier: &str) {
        assert!(VersionTier::new(tier).is_err());
        assert!(tier.parse::<VersionTier>().is_err());
    }
}
