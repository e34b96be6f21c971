//! `StateManager` — the last-run record as a JSON file.
//!
//! Records are validated on both read and write. Writes are staged in a
//! sibling file created owner-only, then renamed over the record.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::RunStateStore;
use crate::domain::run::RunRecord;
use crate::infra::config::app_dir;

pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// `~/.gpu-bootstrap/state.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(app_dir()?.join("state.json")))
    }

    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

fn read_record(path: &Path) -> Result<Option<RunRecord>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading run record {}", path.display())),
    };
    let record: RunRecord = serde_json::from_str(&content)
        .with_context(|| format!("parsing run record {}", path.display()))?;
    record
        .validate()
        .with_context(|| format!("invalid run record {}", path.display()))?;
    Ok(Some(record))
}

fn write_record(path: &Path, record: &RunRecord) -> Result<()> {
    record.validate().context("refusing to save run record")?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
    }
    let json = serde_json::to_vec_pretty(record).context("serializing run record")?;

    let staged = path.with_extension("json.tmp");
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(&staged)
        .with_context(|| format!("creating {}", staged.display()))?;
    file.write_all(&json)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("writing {}", staged.display()))?;
    drop(file);

    std::fs::rename(&staged, path)
        .with_context(|| format!("replacing run record {}", path.display()))?;
    tracing::debug!(path = %path.display(), workers = record.workers.len(), "run recorded");
    Ok(())
}

impl RunStateStore for StateManager {
    async fn load_async(&self) -> Result<Option<RunRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_record(&path))
            .await
            .context("run record load task panicked")?
    }

    async fn save_async(&self, record: &RunRecord) -> Result<()> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || write_record(&path, &record))
            .await
            .context("run record save task panicked")?
    }
}
