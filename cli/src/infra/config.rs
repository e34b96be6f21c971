//! YAML configuration file and the per-user application directory.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::{BootstrapConfig, validate_config};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "GPU_BOOTSTRAP_CONFIG";

/// `~/.gpu-bootstrap`, holding the config file and the last-run record.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn app_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".gpu-bootstrap"))
}

/// Loads `BootstrapConfig` from a YAML file on disk. A missing file means
/// all defaults.
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store at `$GPU_BOOTSTRAP_CONFIG`, or `~/.gpu-bootstrap/config.yaml`.
    #[must_use]
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Store at an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        Ok(app_dir()?.join("config.yaml"))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// invalid value.
    pub fn load(&self) -> Result<BootstrapConfig> {
        let path = self.path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(BootstrapConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: BootstrapConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }
}

impl Default for YamlConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
