//! Application service — launch planning across all devices.

use crate::application::ports::ProgressReporter;
use crate::domain::credentials::Credentials;
use crate::domain::device::Device;
use crate::domain::identity::IdentitySet;
use crate::domain::launch::{LaunchContext, LaunchPlan, SkipReason, plan};

/// Plan one worker per device, skipping (with a warning) devices whose
/// memory is unknown, whose hotkey is not registered, or that lack a bucket.
pub fn plan_all(
    devices: &[Device],
    identities: &IdentitySet,
    credentials: &Credentials,
    ctx: &LaunchContext,
    reporter: &impl ProgressReporter,
) -> Vec<LaunchPlan> {
    let mut plans = Vec::with_capacity(devices.len());
    for device in devices {
        let index = device.index;
        if device.memory_mib.is_none() {
            reporter.warn(&format!("GPU {index} skipped: {}", SkipReason::UnknownMemory));
            continue;
        }
        let Some(identity) = identities.device(index).filter(|id| id.is_registered()) else {
            reporter.warn(&format!("GPU {index} skipped: hotkey not registered"));
            continue;
        };
        match plan(device, identity, credentials, ctx) {
            Ok(p) => {
                reporter.success(&format!(
                    "GPU {index}: {} MiB, tier {:?}, batch size {}",
                    device.memory_mib.unwrap_or_default(),
                    p.tier,
                    p.batch_size
                ));
                plans.push(p);
            }
            Err(reason) => reporter.warn(&format!("GPU {index} skipped: {reason}")),
        }
    }
    plans
}
