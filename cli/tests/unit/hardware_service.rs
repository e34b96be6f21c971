//! Tests for hardware inventory.

use gpu_bootstrap::application::services::hardware::enumerate_devices;
use gpu_bootstrap::domain::device::Device;

use crate::helpers::{FakeDevices, RecordingReporter};

#[tokio::test]
async fn test_devices_follow_query_order() {
    let reporter = RecordingReporter::default();
    let devices = enumerate_devices(&FakeDevices::report("81559\n24576\n"), &reporter).await;
    assert_eq!(
        devices,
        vec![
            Device { index: 0, memory_mib: Some(81_559) },
            Device { index: 1, memory_mib: Some(24_576) },
        ]
    );
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn test_missing_query_tool_yields_zero_devices_with_warning() {
    let reporter = RecordingReporter::default();
    let devices = enumerate_devices(&FakeDevices::unavailable(), &reporter).await;
    assert!(devices.is_empty());
    assert_eq!(reporter.warnings().len(), 1);
    assert!(reporter.warnings()[0].contains("zero devices"));
}

#[tokio::test]
async fn test_unreadable_memory_keeps_index_and_warns() {
    let reporter = RecordingReporter::default();
    let devices = enumerate_devices(&FakeDevices::report("40960\n[N/A]\n81920\n"), &reporter).await;

    assert_eq!(devices.len(), 3);
    assert_eq!(devices[1], Device { index: 1, memory_mib: None });
    assert_eq!(devices[2].index, 2);
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("GPU 1"), "{warnings:?}");
}

#[tokio::test]
async fn test_empty_report_warns_no_gpus() {
    let reporter = RecordingReporter::default();
    assert!(enumerate_devices(&FakeDevices::report(""), &reporter).await.is_empty());
    assert_eq!(reporter.warnings(), vec!["no GPUs detected".to_string()]);
}
