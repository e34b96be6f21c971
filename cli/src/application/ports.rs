//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::credentials::ProfileScan;
use crate::domain::identity::RegistryTarget;
use crate::domain::launch::LaunchPlan;
use crate::domain::run::RunRecord;
use crate::domain::supervisor::SupervisedProcess;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations apply their configured default timeout, if any.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with extra environment variables set.
    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output>;
    /// Run a program with inherited stdio, returning only its exit status.
    ///
    /// Used where the user must see the program's own output.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Facts about the host the pipeline runs on.
pub trait HostInfo {
    /// OS family as in `std::env::consts::OS` (`linux`, `macos`, ...).
    fn os_family(&self) -> &str;
    /// Contents of `/etc/os-release`, if present.
    fn os_release(&self) -> Option<String>;
    /// Whether the process already runs as root (no `sudo` needed).
    fn is_root(&self) -> bool;
    /// Working directory the run was started from.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    fn current_dir(&self) -> Result<PathBuf>;
}

/// Local filesystem operations used by the environment stage.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;
}

/// Composite trait — any type implementing all three sub-traits is a `HostEnvironment`.
pub trait HostEnvironment: CommandRunner + HostInfo + LocalFs {}

/// Blanket implementation: any type implementing all three sub-traits is a `HostEnvironment`.
impl<T> HostEnvironment for T where T: CommandRunner + HostInfo + LocalFs {}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Credential Ports ──────────────────────────────────────────────────────────

/// Persisted credential profile. Append-only: existing entries are never rewritten.
pub trait ProfileStore {
    /// Every exported variable currently in the profile, plus the `export`
    /// lines that could not be read.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile exists but cannot be read.
    fn read_entries(&self) -> Result<ProfileScan>;
    /// Append `entries` to the profile in one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be written.
    fn append(&self, entries: &[(String, String)]) -> Result<()>;
    /// Location shown to the user.
    fn location(&self) -> PathBuf;
}

/// Interactive input.
pub trait Prompter {
    /// `false` in CI or when prompts are disabled.
    fn is_interactive(&self) -> bool;
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    fn confirm(&self, prompt: &str) -> Result<bool>;
    /// Ask for a value; `secret` hides the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn input(&self, prompt: &str, secret: bool) -> Result<String>;
}

// ── Hardware Port ─────────────────────────────────────────────────────────────

/// Per-device memory query.
#[allow(async_fn_in_trait)]
pub trait DeviceQuery {
    /// Raw report, one memory value in MiB per line, in device order.
    ///
    /// # Errors
    ///
    /// Returns an error when the query tool is missing or fails.
    async fn memory_report(&self) -> Result<String>;
}

// ── Identity Ports ────────────────────────────────────────────────────────────

/// Local wallet storage.
#[allow(async_fn_in_trait)]
pub trait WalletStore {
    async fn primary_exists(&self, wallet: &str) -> Result<bool>;
    async fn create_primary(&self, wallet: &str) -> Result<()>;
    async fn hotkey_exists(&self, wallet: &str, hotkey: &str) -> Result<bool>;
    async fn create_hotkey(&self, wallet: &str, hotkey: &str) -> Result<()>;
}

/// Remote subnet registry.
#[allow(async_fn_in_trait)]
pub trait RegistryClient {
    async fn is_registered(&self, wallet: &str, hotkey: &str, target: &RegistryTarget)
    -> Result<bool>;
    async fn register(&self, wallet: &str, hotkey: &str, target: &RegistryTarget) -> Result<()>;
}

// ── Supervisor Port ───────────────────────────────────────────────────────────

/// External process supervisor. Owns every `SupervisedProcess`.
#[allow(async_fn_in_trait)]
pub trait ProcessSupervisor {
    async fn list(&self) -> Result<Vec<SupervisedProcess>>;
    async fn stop_all(&self) -> Result<()>;
    async fn delete_all(&self) -> Result<()>;
    async fn start(&self, plan: &LaunchPlan) -> Result<()>;
}

// ── State Port ────────────────────────────────────────────────────────────────

/// Abstracts run-record persistence (load/save).
#[allow(async_fn_in_trait)]
pub trait RunStateStore {
    /// Load the last run record, returning `None` if none exists.
    async fn load_async(&self) -> Result<Option<RunRecord>>;
    /// Persist the given run record.
    async fn save_async(&self, record: &RunRecord) -> Result<()>;
}
