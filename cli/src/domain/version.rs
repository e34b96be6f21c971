//! Version-string parsing for tool probes.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::{Version, VersionReq};

use crate::domain::error::ConfigError;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("valid regex"));

/// Extract the first `major.minor[.patch]` triple from a tool's version output.
///
/// Handles `Python 3.12.4`, `git version 2.43.0`, `v20.11.1` and `5.3`.
#[must_use]
pub fn extract_version(text: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .map_or(Ok(0), |m| m.as_str().parse())
        .ok()?;
    Some(Version::new(major, minor, patch))
}

/// A `major.minor` Python release, e.g. `3.12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u64,
    pub minor: u64,
}

impl PythonVersion {
    /// Parse a `major.minor` string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` unless the input is exactly `X.Y`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "python.version".to_string(),
            value: raw.to_string(),
            hint: "Expected a major.minor release such as 3.12".to_string(),
        };
        let (major, minor) = raw.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }

    /// Interpreter binary name, e.g. `python3.12`.
    #[must_use]
    pub fn binary(&self) -> String {
        format!("python{self}")
    }

    /// Any patch release of this `major.minor`.
    #[must_use]
    pub fn requirement(&self) -> VersionReq {
        VersionReq {
            comparators: vec![semver::Comparator {
                op: semver::Op::Tilde,
                major: self.major,
                minor: Some(self.minor),
                patch: None,
                pre: semver::Prerelease::EMPTY,
            }],
        }
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
