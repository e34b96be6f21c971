//! Domain types and validators for bootstrap configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::identity::RegistryTarget;
use crate::domain::launch::BatchSizes;
use crate::domain::version::PythonVersion;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.gpu-bootstrap/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Project label passed to workers when none is given on the command line.
    pub project: String,
    pub repository: RepositoryConfig,
    pub python: PythonConfig,
    pub subnet: SubnetConfig,
    pub wallet: WalletConfig,
    pub worker: WorkerConfig,
    /// Shell profile credentials are persisted to. Defaults to `~/.bashrc`
    /// on Linux and `~/.zshrc` on macOS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
    /// Upper bound for installer, clone and registration commands.
    /// Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            project: "templar".to_string(),
            repository: RepositoryConfig::default(),
            python: PythonConfig::default(),
            subnet: SubnetConfig::default(),
            wallet: WalletConfig::default(),
            worker: WorkerConfig::default(),
            profile_path: None,
            command_timeout_secs: None,
        }
    }
}

/// Worker codebase location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub url: String,
    /// Clone target, relative to the working directory.
    pub checkout_dir: PathBuf,
    /// File whose presence marks a directory as a checkout of the worker repo.
    pub marker: PathBuf,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/tplr-ai/templar.git".to_string(),
            checkout_dir: PathBuf::from("templar"),
            marker: PathBuf::from("neurons/miner.py"),
        }
    }
}

/// Language runtime and dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// `major.minor` release, e.g. `3.12`.
    pub version: String,
    /// Dependency manifest relative to the checkout: a `requirements*.txt`
    /// file or `pyproject.toml`.
    pub manifest: PathBuf,
}

impl Default for PythonConfig {
    fn default() -> Self {
        Self {
            version: "3.12".to_string(),
            manifest: PathBuf::from("requirements.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubnetConfig {
    pub netuid: u16,
    pub network: String,
}

impl Default for SubnetConfig {
    fn default() -> Self {
        Self {
            netuid: 3,
            network: "finney".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Primary (coldkey) wallet name.
    pub name: String,
    /// Hotkeys are named `<hotkey_prefix>_<gpu index>`.
    pub hotkey_prefix: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            hotkey_prefix: "miner".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker script relative to the checkout.
    pub entrypoint: PathBuf,
    /// Supervised processes are named `<process_prefix>_<gpu index>`.
    pub process_prefix: String,
    pub batch_sizes: BatchSizes,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            entrypoint: PathBuf::from("neurons/miner.py"),
            process_prefix: "worker".to_string(),
            batch_sizes: BatchSizes::default(),
        }
    }
}

impl BootstrapConfig {
    /// Registry namespace hotkeys are registered under.
    #[must_use]
    pub fn registry_target(&self) -> RegistryTarget {
        RegistryTarget {
            netuid: self.subnet.netuid,
            network: self.subnet.network.clone(),
        }
    }

    /// Parsed Python release. Only valid after `validate_config` passed.
    ///
    /// # Errors
    ///
    /// Returns an error if `python.version` is not `major.minor`.
    pub fn python_version(&self) -> Result<PythonVersion> {
        Ok(PythonVersion::parse(&self.python.version)?)
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validate a loaded configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the first offending key.
pub fn validate_config(config: &BootstrapConfig) -> Result<()> {
    PythonVersion::parse(&config.python.version)?;

    let names = [
        ("project", &config.project),
        ("repository.url", &config.repository.url),
        ("subnet.network", &config.subnet.network),
        ("wallet.name", &config.wallet.name),
        ("wallet.hotkey_prefix", &config.wallet.hotkey_prefix),
        ("worker.process_prefix", &config.worker.process_prefix),
    ];
    for (key, value) in names {
        if value.trim().is_empty() {
            return Err(invalid(key, value, "Must not be empty"));
        }
    }

    let sizes = config.worker.batch_sizes;
    for (key, value) in [
        ("worker.batch_sizes.a", sizes.a),
        ("worker.batch_sizes.b", sizes.b),
        ("worker.batch_sizes.c", sizes.c),
    ] {
        if value == 0 {
            return Err(invalid(key, "0", "Batch sizes must be at least 1"));
        }
    }

    if config.command_timeout_secs == Some(0) {
        return Err(invalid(
            "command_timeout_secs",
            "0",
            "Use a positive number of seconds, or remove the key to wait indefinitely",
        ));
    }
    Ok(())
}

fn invalid(key: &str, value: &str, hint: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        hint: hint.to_string(),
    }
    .into()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
