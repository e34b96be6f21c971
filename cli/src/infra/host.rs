//! `LocalHost` — the machine the pipeline runs on.
//!
//! Implements `HostInfo` and `LocalFs` directly and delegates `CommandRunner`
//! to a wrapped runner, so one value satisfies `HostEnvironment`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostInfo, LocalFs};

const OS_RELEASE: &str = "/etc/os-release";

pub struct LocalHost<R> {
    runner: R,
}

impl<R: CommandRunner> LocalHost<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The wrapped runner, for adapters that only need process execution.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> CommandRunner for LocalHost<R> {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.runner.run(program, args).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        self.runner.run_with_timeout(program, args, timeout).await
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output> {
        self.runner.run_with_env(program, args, envs).await
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        self.runner.run_status(program, args).await
    }
}

impl<R> HostInfo for LocalHost<R> {
    fn os_family(&self) -> &str {
        std::env::consts::OS
    }

    fn os_release(&self) -> Option<String> {
        std::fs::read_to_string(OS_RELEASE).ok()
    }

    fn is_root(&self) -> bool {
        effective_uid_is_root()
    }

    fn current_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().context("cannot determine working directory")
    }
}

impl<R> LocalFs for LocalHost<R> {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }
}

/// Only apt recipes consult this; Homebrew refuses to run as root anyway.
#[cfg(target_os = "linux")]
fn effective_uid_is_root() -> bool {
    use std::os::unix::fs::MetadataExt;
    // /proc/self is owned by the effective uid, which survives `sudo -E`.
    std::fs::metadata("/proc/self").is_ok_and(|meta| meta.uid() == 0)
}

#[cfg(not(target_os = "linux"))]
fn effective_uid_is_root() -> bool {
    false
}
