//! Application service — hardware inventory.

use crate::application::ports::{DeviceQuery, ProgressReporter};
use crate::domain::device::{Device, parse_memory_report};
use crate::domain::error::BootstrapError;

/// Enumerate GPUs in the query tool's native order. Never fails: a missing
/// or failing query tool yields zero devices and a warning.
pub async fn enumerate_devices(
    query: &impl DeviceQuery,
    reporter: &impl ProgressReporter,
) -> Vec<Device> {
    let report = match query.memory_report().await {
        Ok(report) => report,
        Err(e) => {
            reporter.warn(&format!(
                "GPU query unavailable ({e:#}); continuing with zero devices"
            ));
            return Vec::new();
        }
    };

    let (devices, unreadable) = parse_memory_report(&report);
    for entry in unreadable {
        let err = BootstrapError::UnknownDeviceMemory {
            index: entry.index,
            raw: entry.raw,
        };
        reporter.warn(&format!("{err}; it will not be launched"));
    }

    if devices.is_empty() {
        reporter.warn("no GPUs detected");
    } else {
        reporter.success(&format!("found {} GPU(s)", devices.len()));
    }
    devices
}
