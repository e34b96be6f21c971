//! Application service — full bootstrap pipeline.
//!
//! Stages run strictly in order and each is a hard gate, except hardware
//! inventory which degrades to zero devices. Per-index registration and
//! memory problems are handled inside their stages.

use anyhow::Result;

use crate::application::ports::{
    DeviceQuery, HostEnvironment, ProcessSupervisor, ProfileStore, ProgressReporter, Prompter,
    RegistryClient, WalletStore,
};
use crate::application::services::credentials::load_or_collect;
use crate::application::services::environment::provision;
use crate::application::services::hardware::enumerate_devices;
use crate::application::services::identities::{IdentityOptions, ensure_identities};
use crate::application::services::planner::plan_all;
use crate::application::services::supervisor::restart_all;
use crate::domain::config::BootstrapConfig;
use crate::domain::credentials::REQUIRED_CREDENTIALS;
use crate::domain::device::Device;
use crate::domain::identity::IdentitySet;
use crate::domain::launch::{LaunchContext, LaunchPlan};
use crate::domain::workspace::Workspace;

/// Every adapter the pipeline talks to.
pub struct Ports<'a, H, P, Q, D, W, G, S> {
    pub host: &'a H,
    pub profile: &'a P,
    pub prompter: &'a Q,
    pub devices: &'a D,
    pub wallets: &'a W,
    pub registry: &'a G,
    pub supervisor: &'a S,
}

/// Per-run inputs.
pub struct BootstrapOptions<'a> {
    pub config: &'a BootstrapConfig,
    /// Project label for this run; falls back to `config.project`.
    pub project: Option<&'a str>,
}

impl BootstrapOptions<'_> {
    #[must_use]
    pub fn project(&self) -> &str {
        self.project
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(self.config.project.as_str())
    }
}

/// What a completed run produced.
#[derive(Debug)]
pub struct BootstrapSummary {
    pub workspace: Workspace,
    pub devices: Vec<Device>,
    pub identities: IdentitySet,
    pub plans: Vec<LaunchPlan>,
    /// Supervisor names of the started workers.
    pub started: Vec<String>,
}

/// Run every stage from environment provisioning to worker launch.
///
/// # Errors
///
/// Returns the first fatal stage error; stages already applied are left in
/// place since every stage is idempotent.
pub async fn run_bootstrap<H, P, Q, D, W, G, S>(
    ports: &Ports<'_, H, P, Q, D, W, G, S>,
    opts: &BootstrapOptions<'_>,
    reporter: &impl ProgressReporter,
) -> Result<BootstrapSummary>
where
    H: HostEnvironment,
    P: ProfileStore,
    Q: Prompter,
    D: DeviceQuery,
    W: WalletStore,
    G: RegistryClient,
    S: ProcessSupervisor,
{
    let config = opts.config;

    tracing::info!("stage: environment");
    let workspace = provision(ports.host, config, reporter).await?;

    tracing::info!("stage: credentials");
    let credentials = load_or_collect(
        ports.profile,
        ports.prompter,
        reporter,
        REQUIRED_CREDENTIALS,
    )?;

    tracing::info!("stage: hardware");
    let devices = enumerate_devices(ports.devices, reporter).await;

    // Devices with unknown memory can never be launched; they get no hotkey.
    let launchable: Vec<usize> = devices
        .iter()
        .filter(|d| d.memory_mib.is_some())
        .map(|d| d.index)
        .collect();
    tracing::info!(count = launchable.len(), "stage: identities");
    let target = config.registry_target();
    let identities = ensure_identities(
        ports.wallets,
        ports.registry,
        reporter,
        &IdentityOptions {
            wallet: &config.wallet.name,
            hotkey_prefix: &config.wallet.hotkey_prefix,
            target: &target,
        },
        &launchable,
    )
    .await?;

    tracing::info!("stage: planning");
    let ctx = launch_context(config, opts.project(), &workspace);
    let plans = plan_all(&devices, &identities, &credentials, &ctx, reporter);

    tracing::info!(plans = plans.len(), "stage: supervisor");
    let started = restart_all(ports.supervisor, &plans, reporter).await?;

    Ok(BootstrapSummary {
        workspace,
        devices,
        identities,
        plans,
        started,
    })
}

/// Shared launch inputs for a provisioned workspace.
#[must_use]
pub fn launch_context(config: &BootstrapConfig, project: &str, workspace: &Workspace) -> LaunchContext {
    LaunchContext {
        wallet_name: config.wallet.name.clone(),
        project: project.to_string(),
        target: config.registry_target(),
        batch_sizes: config.worker.batch_sizes,
        process_prefix: config.worker.process_prefix.clone(),
        script: workspace.checkout.join(&config.worker.entrypoint),
        interpreter: workspace.python(),
        cwd: workspace.checkout.clone(),
    }
}
