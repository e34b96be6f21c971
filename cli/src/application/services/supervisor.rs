//! Application service — process supervisor bridge.

use anyhow::{Context, Result};

use crate::application::ports::{ProcessSupervisor, ProgressReporter};
use crate::domain::launch::LaunchPlan;

/// Retire every supervised process, then start one per plan.
///
/// Returns the names of the started processes, in plan order.
///
/// # Errors
///
/// Returns an error if the supervisor cannot list, stop, delete or start
/// processes.
pub async fn restart_all(
    supervisor: &impl ProcessSupervisor,
    plans: &[LaunchPlan],
    reporter: &impl ProgressReporter,
) -> Result<Vec<String>> {
    let existing = supervisor
        .list()
        .await
        .context("listing supervised processes")?;
    if existing.iter().any(|p| p.is_running()) {
        reporter.step(&format!(
            "stopping {} supervised process(es)...",
            existing.len()
        ));
        supervisor.stop_all().await.context("stopping processes")?;
        supervisor.delete_all().await.context("removing processes")?;
    } else if !existing.is_empty() {
        // Stopped leftovers would collide with same-named starts.
        supervisor.delete_all().await.context("removing processes")?;
    }

    let mut started = Vec::with_capacity(plans.len());
    for plan in plans {
        reporter.step(&format!(
            "starting {} on GPU {} (batch size {})...",
            plan.process_name, plan.device_index, plan.batch_size
        ));
        supervisor
            .start(plan)
            .await
            .with_context(|| format!("starting {}", plan.process_name))?;
        started.push(plan.process_name.clone());
    }

    if started.is_empty() {
        reporter.warn("no workers launched");
    } else {
        reporter.success(&format!("{} worker(s) running", started.len()));
    }
    Ok(started)
}
