//! Published artifact naming.

use std::fmt;

use crate::{Platform, VersionTier};

/// Identifies one prebuilt artifact: `<prefix>-<os>-<arch>-<tier>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactId {
    prefix: String,
    platform: Platform,
    tier: VersionTier,
}

impl ArtifactId {
    pub fn new(prefix: impl Into<String>, platform: Platform, tier: VersionTier) -> Self {
        Self {
            prefix: prefix.into(),
            platform,
            tier,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn tier(&self) -> &VersionTier {
        &self.tier
    }

    /// Release asset file name, lower-cased.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}-{}.{}",
            self.prefix,
            self.platform.os(),
            self.platform.arch(),
            self.tier,
            self.platform.library_extension()
        )
        .to_lowercase()
    }

    /// Full download URL below the versioned release directory.
    pub fn download_url(&self, release_url: &str) -> String {
        format!("{}/{}", release_url.trim_end_matches('/'), self.file_name())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn linux_v1() -> ArtifactId {
        ArtifactId::new(
            "diffdirs",
            Platform::new("Linux", "x86_64"),
            VersionTier::new("v1").unwrap(),
        )
    }

    #[test]
    fn composes_lowercase_file_name() {
        assert_eq!(linux_v1().file_name(), "diffdirs-linux-x86_64-v1.so");
    }

    #[test]
    fn prefix_is_lowercased_too() {
        let artifact = ArtifactId::new(
            "DiffDirs",
            Platform::new("macos", "aarch64"),
            VersionTier::nightly(),
        );

        assert_eq!(artifact.to_string(), "diffdirs-macos-aarch64-nightly.dylib");
    }

    #[test]
    fn appends_file_name_to_release_url() {
        let expected =
            "https://github.com/o/r/releases/download/v0.1.0/diffdirs-linux-x86_64-v1.so";

        assert_eq!(
            linux_v1().download_url("https://github.com/o/r/releases/download/v0.1.0"),
            expected
        );
        assert_eq!(
            linux_v1().download_url("https://github.com/o/r/releases/download/v0.1.0/"),
            expected
        );
    }
}
