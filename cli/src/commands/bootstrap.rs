//! The bootstrap command: wire real adapters into the pipeline, run it,
//! print what was launched and record the run.

use std::time::Duration;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::RunStateStore;
use crate::application::services::bootstrap::{
    BootstrapOptions, BootstrapSummary, Ports, run_bootstrap,
};
use crate::application::services::environment::resolve_checkout;
use crate::domain::run::RunRecord;
use crate::domain::workspace::Workspace;
use crate::infra::btcli::{BtcliRegistry, BtcliWallets, default_wallets_dir};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::gpu::NvidiaSmi;
use crate::infra::host::LocalHost;
use crate::infra::pm2::Pm2Supervisor;
use crate::infra::profile::ShellProfile;
use crate::infra::prompt::DialoguerPrompter;
use crate::output::{OutputContext, TerminalReporter};

/// Run the full pipeline against this host.
///
/// # Errors
///
/// Returns the first fatal stage error.
pub async fn run(app: &AppContext, project: Option<&str>) -> Result<()> {
    let out = &app.output;
    let config = app.config_store.load()?;

    match app.state_mgr.load_async().await {
        Ok(Some(last)) => out.kv(
            "Last run:",
            &format!(
                "{} ({}, {} worker(s))",
                last.completed_at.format("%Y-%m-%d %H:%M UTC"),
                last.project,
                last.workers.len()
            ),
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable run record"),
    }

    let runner = TokioCommandRunner::new(config.command_timeout_secs.map(Duration::from_secs))
        .verbose(app.debug);
    let host = LocalHost::new(runner);

    // Adapters below run tools from the worker environment, so its location
    // is fixed before provisioning creates it.
    let workspace = Workspace::new(resolve_checkout(&host, &config.repository)?);
    let profile_path = match &config.profile_path {
        Some(path) => path.clone(),
        None => ShellProfile::default_path()?,
    };
    let profile = ShellProfile::new(profile_path);
    let prompter = DialoguerPrompter::from_env();
    let devices = NvidiaSmi::new(host.runner());
    let wallets_dir = default_wallets_dir()?;
    let btcli = workspace.bin("btcli");
    let wallets = BtcliWallets::new(host.runner(), btcli.clone(), wallets_dir.clone());
    let registry = BtcliRegistry::new(host.runner(), btcli, workspace.python(), wallets_dir);
    let supervisor = Pm2Supervisor::new(host.runner());

    let ports = Ports {
        host: &host,
        profile: &profile,
        prompter: &prompter,
        devices: &devices,
        wallets: &wallets,
        registry: &registry,
        supervisor: &supervisor,
    };
    let opts = BootstrapOptions {
        config: &config,
        project,
    };

    out.header("Bootstrapping GPU workers");
    let reporter = TerminalReporter::new(out);
    let summary = run_bootstrap(&ports, &opts, &reporter).await?;
    print_summary(out, &summary);

    let record = RunRecord::completed_now(opts.project(), summary.started.clone());
    if let Err(e) = app.state_mgr.save_async(&record).await {
        out.warn(&format!("could not record this run: {e:#}"));
    }
    Ok(())
}

fn print_summary(out: &OutputContext, summary: &BootstrapSummary) {
    println!();
    out.header("Summary");
    out.kv("Checkout:", &summary.workspace.checkout.display().to_string());
    out.kv(
        "GPUs:",
        &format!(
            "{} detected, {} launched",
            summary.devices.len(),
            summary.plans.len()
        ),
    );
    for plan in &summary.plans {
        out.kv(
            &format!("{}:", plan.process_name),
            &format!(
                "GPU {}  tier {:?}  batch size {}",
                plan.device_index, plan.tier, plan.batch_size
            ),
        );
    }
    if !summary.plans.is_empty() {
        out.success("Workers started. Follow them with `pm2 logs`.");
    }
}
