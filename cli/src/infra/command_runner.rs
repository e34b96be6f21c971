//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution, killing the child when a timeout fires.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::application::ports::CommandRunner;

/// Production `CommandRunner`.
///
/// `timeout` bounds `run` and `run_with_env`; `None` waits indefinitely,
/// which is what package installs and registrations need by default.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
    verbose: bool,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            verbose: false,
        }
    }

    /// Echo every captured stdout/stderr to the terminal after the command exits.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    async fn execute(
        &self,
        mut command: Command,
        program: &str,
        timeout: Option<Duration>,
    ) -> Result<Output> {
        let mut child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        let collect = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
            );
            anyhow::Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        };

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result?,
                Err(_) => {
                    // Returning drops `child`, and kill_on_drop kills it.
                    anyhow::bail!("{program} timed out after {}s", limit.as_secs())
                }
            },
            None => collect.await?,
        };

        tracing::debug!(program, status = %output.status, "command finished");
        if self.verbose {
            eprint!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
        }
        Ok(output)
    }
}

/// Turn a non-zero exit into an error carrying the last stderr line.
///
/// # Errors
///
/// Returns an error when `output.status` is not success.
pub fn ensure_success(label: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) => anyhow::bail!("{label} failed ({}): {}", output.status, line.trim()),
        None => anyhow::bail!("{label} failed ({})", output.status),
    }
}

fn command(program: &str, args: &[&str]) -> Command {
    tracing::debug!(program, ?args, "running command");
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.execute(command(program, args), program, self.timeout)
            .await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        self.execute(command(program, args), program, Some(timeout))
            .await
    }

    async fn run_with_env(
        &self,
        program: &str,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> Result<Output> {
        let mut cmd = command(program, args);
        cmd.envs(envs.iter().copied());
        self.execute(cmd, program, self.timeout).await
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        let mut child = command(program, args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}
