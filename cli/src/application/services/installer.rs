//! Application service — idempotent installer.
//!
//! A `Dependency` pairs a side-effect-free probe with an install action.
//! `ensure` runs the action only when the probe fails, so re-running the
//! whole pipeline is a no-op for everything already in place.

use std::process::Output;
use std::time::Duration;

use crate::application::ports::{CommandRunner, ProgressReporter};
use crate::domain::error::BootstrapError;
use crate::domain::step::{CommandSpec, StepResult};

/// Upper bound for presence probes (`--version` calls and similar).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Something the pipeline can detect and, when absent, install.
#[allow(async_fn_in_trait)]
pub trait Dependency {
    /// Step name used in status lines and errors.
    fn name(&self) -> String;
    /// Detect whether the dependency is satisfied. Must not change host state.
    async fn probe(&self) -> bool;
    /// Install the dependency.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform` when no recipe exists for the host and
    /// `InstallFailed` when an install command fails.
    async fn install(&self) -> Result<(), BootstrapError>;
}

/// Ensure `dep` is satisfied, installing it if the probe fails.
///
/// Never retries. A successful install is followed by a second probe; if
/// that still fails the step is reported as `MissingTool`.
pub async fn ensure(dep: &impl Dependency, reporter: &impl ProgressReporter) -> StepResult {
    let name = dep.name();
    if dep.probe().await {
        reporter.success(&format!("{name} already satisfied"));
        return StepResult::AlreadySatisfied;
    }

    reporter.step(&format!("installing {name}..."));
    if let Err(err) = dep.install().await {
        tracing::debug!(step = %name, error = %err, "install failed");
        return StepResult::Failed(err);
    }

    if !dep.probe().await {
        return StepResult::Failed(BootstrapError::MissingTool {
            tool: name,
            detail: "install finished but the tool is still not detected".to_string(),
        });
    }
    reporter.success(&format!("{name} installed"));
    StepResult::Installed
}

/// Run one install command, mapping spawn errors and non-zero exits to
/// `InstallFailed` for `step`.
///
/// # Errors
///
/// Returns `BootstrapError::InstallFailed` with the command and the tail of
/// its stderr.
pub async fn run_checked(
    runner: &impl CommandRunner,
    step: &str,
    cmd: &CommandSpec,
) -> Result<Output, BootstrapError> {
    let output = runner
        .run(&cmd.program, &cmd.arg_refs())
        .await
        .map_err(|e| BootstrapError::InstallFailed {
            step: step.to_string(),
            reason: format!("`{cmd}`: {e:#}"),
        })?;
    if !output.status.success() {
        return Err(BootstrapError::InstallFailed {
            step: step.to_string(),
            reason: format!(
                "`{cmd}` exited with {}{}",
                output.status,
                stderr_tail(&output.stderr)
            ),
        });
    }
    Ok(output)
}

/// Run a probe command, returning its output only on a zero exit.
pub async fn probe_succeeds(runner: &impl CommandRunner, cmd: &CommandSpec) -> Option<Output> {
    match runner
        .run_with_timeout(&cmd.program, &cmd.arg_refs(), PROBE_TIMEOUT)
        .await
    {
        Ok(out) if out.status.success() => Some(out),
        Ok(out) => {
            tracing::debug!(command = %cmd, status = %out.status, "probe failed");
            None
        }
        Err(e) => {
            tracing::debug!(command = %cmd, error = %e, "probe could not run");
            None
        }
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return String::new();
    }
    let tail = &lines[lines.len().saturating_sub(3)..];
    format!(": {}", tail.join(" | "))
}
