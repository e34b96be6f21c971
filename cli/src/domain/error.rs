//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Bootstrap errors ──────────────────────────────────────────────────────────

/// Failure taxonomy for the provisioning pipeline.
///
/// Fatal kinds abort the run. `RegistrationFailed` and `UnknownDeviceMemory`
/// only exclude one device index and are reported as warnings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("Unsupported platform: {0}. Supported: Debian/Ubuntu Linux, macOS with Homebrew.")]
    UnsupportedPlatform(String),

    #[error("{tool} is not available: {detail}")]
    MissingTool { tool: String, detail: String },

    #[error("{step} failed: {reason}")]
    InstallFailed { step: String, reason: String },

    #[error("Aborted by user.")]
    UserAborted,

    #[error(
        "Missing credentials in non-interactive mode: {}. Add them to your shell profile or run interactively.",
        .0.join(", ")
    )]
    MissingCredentials(Vec<String>),

    #[error("registration of '{identity}' failed: {reason}")]
    RegistrationFailed { identity: String, reason: String },

    #[error("GPU {index} reported unreadable memory '{raw}'")]
    UnknownDeviceMemory { index: usize, raw: String },
}

impl BootstrapError {
    /// Returns `true` when the error must abort the whole run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::RegistrationFailed { .. } | Self::UnknownDeviceMemory { .. }
        )
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating `config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}
