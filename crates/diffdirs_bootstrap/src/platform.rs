//! Host platform identity.

use std::fmt;

use serde::Serialize;

/// Operating system family and CPU architecture, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    pub fn new(os: impl AsRef<str>, arch: impl AsRef<str>) -> Self {
        Self {
            os: os.as_ref().to_lowercase(),
            arch: arch.as_ref().to_lowercase(),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    pub fn is_macos(&self) -> bool {
        matches!(self.os.as_str(), "macos" | "darwin")
    }

    /// Shared library suffix used for published artifacts.
    pub fn library_extension(&self) -> &'static str {
        if self.is_windows() {
            "dll"
        } else if self.is_macos() {
            "dylib"
        } else {
            "so"
        }
    }

    /// Suffix the editor's module loader looks for. Lua `cpath` uses `.so`
    /// on every unix, macOS included.
    pub fn module_extension(&self) -> &'static str {
        if self.is_windows() { "dll" } else { "so" }
    }

    /// File names `cargo build` may produce for a `cdylib` named
    /// `crate_name`, most likely first.
    pub fn built_library_candidates(&self, crate_name: &str) -> Vec<String> {
        let stem = crate_name.replace('-', "_");
        if self.is_windows() {
            vec![format!("{stem}.dll"), format!("lib{stem}.dll")]
        } else if self.is_macos() {
            vec![format!("lib{stem}.dylib"), format!("lib{stem}.so")]
        } else {
            vec![format!("lib{stem}.so"), format!("lib{stem}.dylib")]
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
