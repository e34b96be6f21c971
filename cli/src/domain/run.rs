//! Record of the last completed run, persisted to `~/.gpu-bootstrap/state.json`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub completed_at: DateTime<Utc>,
    pub project: String,
    /// Supervisor names of the workers this run started.
    #[serde(default)]
    pub workers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunRecordError {
    #[error("run record has an empty project label")]
    EmptyProject,
    #[error("run record lists worker '{0}' more than once")]
    DuplicateWorker(String),
    #[error("run record lists a worker with an empty name")]
    EmptyWorker,
}

impl RunRecord {
    /// A record stamped with the current time.
    #[must_use]
    pub fn completed_now(project: &str, workers: Vec<String>) -> Self {
        Self {
            completed_at: Utc::now(),
            project: project.to_string(),
            workers,
        }
    }

    /// Check the record could have come from a real run.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), RunRecordError> {
        if self.project.trim().is_empty() {
            return Err(RunRecordError::EmptyProject);
        }
        let mut seen = HashSet::new();
        for name in &self.workers {
            if name.trim().is_empty() {
                return Err(RunRecordError::EmptyWorker);
            }
            if !seen.insert(name.as_str()) {
                return Err(RunRecordError::DuplicateWorker(name.clone()));
            }
        }
        Ok(())
    }
}
