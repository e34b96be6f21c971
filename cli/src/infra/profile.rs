//! `ShellProfile` — credentials persisted as `export` lines in a shell rc file.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ProfileStore;
use crate::domain::credentials::{ProfileScan, format_export, parse_profile};

const SECTION_MARKER: &str = "# added by gpu-bootstrap";

pub struct ShellProfile {
    path: PathBuf,
}

impl ShellProfile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.zshrc` on macOS, `~/.bashrc` elsewhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        let rc = if cfg!(target_os = "macos") {
            ".zshrc"
        } else {
            ".bashrc"
        };
        Ok(home.join(rc))
    }
}

impl ProfileStore for ShellProfile {
    fn read_entries(&self) -> Result<ProfileScan> {
        if !self.path.exists() {
            return Ok(ProfileScan::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        Ok(parse_profile(&content))
    }

    fn append(&self, entries: &[(String, String)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let needs_newline = std::fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
            .unwrap_or(false);

        let mut block = String::new();
        if needs_newline {
            block.push('\n');
        }
        block.push('\n');
        block.push_str(SECTION_MARKER);
        block.push('\n');
        for (name, value) in entries {
            block.push_str(&format_export(name, value));
            block.push('\n');
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        file.write_all(block.as_bytes())
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = entries.len(), "profile updated");
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
