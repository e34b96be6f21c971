//! Processes owned by the external process supervisor.

/// Lifecycle state as reported by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Stopped,
    /// Any other supervisor state (`errored`, `launching`, ...).
    Other(String),
}

impl ProcessStatus {
    /// Map a supervisor status string onto a `ProcessStatus`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "online" | "running" => Self::Running,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisedProcess {
    pub name: String,
    pub status: ProcessStatus,
}

impl SupervisedProcess {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == ProcessStatus::Running
    }
}
