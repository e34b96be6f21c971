//! Application service — environment provisioning.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through the injected `HostEnvironment`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::VersionReq;

use crate::application::ports::{HostEnvironment, ProgressReporter};
use crate::application::services::installer::{Dependency, ensure, probe_succeeds, run_checked};
use crate::domain::config::{BootstrapConfig, RepositoryConfig};
use crate::domain::error::BootstrapError;
use crate::domain::platform::{Platform, Tool, detect_platform};
use crate::domain::step::CommandSpec;
use crate::domain::version::extract_version;
use crate::domain::workspace::{Workspace, manifest_digest, pip_install_args};

/// Ensure system tools, the worker checkout, its isolated environment and
/// its declared dependencies, in that order. The first failure aborts.
///
/// # Errors
///
/// Returns the failing step's `BootstrapError`, or an error if the working
/// directory cannot be determined.
pub async fn provision(
    host: &impl HostEnvironment,
    config: &BootstrapConfig,
    reporter: &impl ProgressReporter,
) -> Result<Workspace> {
    let python = config.python_version()?;
    let platform = detect_platform(host.os_family(), host.os_release().as_deref());
    if let Err(err) = &platform {
        tracing::debug!(error = %err, "platform not recognised; installs will fail");
    }

    for tool in [Tool::Git, Tool::Node, Tool::Pm2, Tool::Python(python)] {
        let requirement = match tool {
            Tool::Python(v) => Some(v.requirement()),
            _ => None,
        };
        let dep = ToolDependency {
            host,
            tool,
            platform: &platform,
            requirement,
        };
        ensure(&dep, reporter).await.into_result()?;
    }

    let cwd = host.current_dir()?;
    let checkout = resolve_checkout(host, &config.repository)?;
    if checkout == cwd {
        reporter.success(&format!("using checkout in place at {}", cwd.display()));
    } else {
        let dep = CloneDependency {
            host,
            url: &config.repository.url,
            target: &checkout,
        };
        ensure(&dep, reporter).await.into_result()?;
    }
    let workspace = Workspace::new(checkout);

    let venv = VenvDependency {
        host,
        interpreter: python.binary(),
        workspace: &workspace,
    };
    ensure(&venv, reporter).await.into_result()?;

    let packages = PackagesDependency {
        host,
        workspace: &workspace,
        manifest: &config.python.manifest,
    };
    ensure(&packages, reporter).await.into_result()?;

    Ok(workspace)
}

/// Where the worker checkout lives: the working directory when it already is
/// a checkout (has `.git` and the marker file), otherwise
/// `<cwd>/<checkout_dir>`.
///
/// Side-effect free; callers may resolve it before provisioning.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn resolve_checkout(host: &impl HostEnvironment, repo: &RepositoryConfig) -> Result<PathBuf> {
    let cwd = host.current_dir().context("determining working directory")?;
    if host.exists(&cwd.join(".git")) && host.exists(&cwd.join(&repo.marker)) {
        return Ok(cwd);
    }
    Ok(cwd.join(&repo.checkout_dir))
}

// ── Dependencies ──────────────────────────────────────────────────────────────

/// A system tool installed through the platform package manager.
struct ToolDependency<'a, H> {
    host: &'a H,
    tool: Tool,
    platform: &'a Result<Platform, BootstrapError>,
    /// Version the first probe's output must satisfy.
    requirement: Option<VersionReq>,
}

impl<H: HostEnvironment> Dependency for ToolDependency<'_, H> {
    fn name(&self) -> String {
        self.tool.label()
    }

    async fn probe(&self) -> bool {
        for (i, cmd) in self.tool.probes().iter().enumerate() {
            let Some(output) = probe_succeeds(self.host, cmd).await else {
                return false;
            };
            if let (0, Some(req)) = (i, &self.requirement) {
                // Older interpreters print their version on stderr.
                let text = format!(
                    "{}{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                );
                match extract_version(&text) {
                    Some(found) if req.matches(&found) => {}
                    found => {
                        tracing::debug!(tool = %self.tool.label(), ?found, "version mismatch");
                        return false;
                    }
                }
            }
        }
        true
    }

    async fn install(&self) -> Result<(), BootstrapError> {
        let platform = self.platform.clone()?;
        let step = self.tool.label();
        for cmd in self.tool.install_commands(platform, !self.host.is_root()) {
            run_checked(self.host, &step, &cmd).await?;
        }
        Ok(())
    }
}

/// Clone of the worker repository at a fixed path.
struct CloneDependency<'a, H> {
    host: &'a H,
    url: &'a str,
    target: &'a Path,
}

impl<H: HostEnvironment> Dependency for CloneDependency<'_, H> {
    fn name(&self) -> String {
        format!("checkout {}", self.target.display())
    }

    async fn probe(&self) -> bool {
        self.host.exists(&self.target.join(".git"))
    }

    async fn install(&self) -> Result<(), BootstrapError> {
        let target = self.target.to_string_lossy();
        let cmd = CommandSpec::new("git", ["clone", self.url, &*target]);
        run_checked(self.host, "clone", &cmd).await.map(drop)
    }
}

/// The checkout's isolated environment.
struct VenvDependency<'a, H> {
    host: &'a H,
    interpreter: String,
    workspace: &'a Workspace,
}

impl<H: HostEnvironment> Dependency for VenvDependency<'_, H> {
    fn name(&self) -> String {
        "virtual environment".to_string()
    }

    async fn probe(&self) -> bool {
        self.host.exists(&self.workspace.python())
    }

    async fn install(&self) -> Result<(), BootstrapError> {
        let venv = self.workspace.venv().to_string_lossy().into_owned();
        let cmd = CommandSpec::new(&self.interpreter, ["-m".to_string(), "venv".to_string(), venv]);
        run_checked(self.host, "virtual environment", &cmd)
            .await
            .map(drop)
    }
}

/// Declared third-party packages, tracked by a digest stamp of the manifest.
struct PackagesDependency<'a, H> {
    host: &'a H,
    workspace: &'a Workspace,
    manifest: &'a Path,
}

impl<H: HostEnvironment> PackagesDependency<'_, H> {
    fn manifest_path(&self) -> PathBuf {
        self.workspace.checkout.join(self.manifest)
    }

    fn current_digest(&self) -> Option<String> {
        self.host
            .read(&self.manifest_path())
            .ok()
            .map(|content| manifest_digest(&content))
    }
}

impl<H: HostEnvironment> Dependency for PackagesDependency<'_, H> {
    fn name(&self) -> String {
        format!("dependencies from {}", self.manifest.display())
    }

    async fn probe(&self) -> bool {
        let Some(digest) = self.current_digest() else {
            return false;
        };
        self.host
            .read(&self.workspace.stamp_path())
            .is_ok_and(|stamp| String::from_utf8_lossy(&stamp).trim() == digest)
    }

    async fn install(&self) -> Result<(), BootstrapError> {
        let step = "dependencies";
        let digest = self.current_digest().ok_or_else(|| BootstrapError::InstallFailed {
            step: step.to_string(),
            reason: format!("manifest {} not found", self.manifest_path().display()),
        })?;
        let python = self.workspace.python().to_string_lossy().into_owned();
        let cmd = CommandSpec::new(
            &python,
            pip_install_args(&self.workspace.checkout, self.manifest),
        );
        run_checked(self.host, step, &cmd).await?;
        self.host
            .write(&self.workspace.stamp_path(), digest.as_bytes())
            .map_err(|e| BootstrapError::InstallFailed {
                step: step.to_string(),
                reason: format!("writing stamp: {e:#}"),
            })
    }
}
