//! Property-based tests for tier selection, inventory parsing and profile lines.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use gpu_bootstrap::domain::credentials::{format_export, parse_export};
use gpu_bootstrap::domain::device::parse_memory_report;
use gpu_bootstrap::domain::launch::{BatchSizes, BatchTier, TIER_TABLE};

proptest! {
    /// More memory never selects a lower tier.
    #[test]
    fn prop_tier_is_monotonic(a in 0u64..200_000, b in 0u64..200_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        // A < B < C in declaration order, so a better tier compares smaller.
        prop_assert!(BatchTier::for_memory(hi) <= BatchTier::for_memory(lo));
    }

    /// The selected tier is the first table entry whose threshold is reached.
    #[test]
    fn prop_tier_matches_first_reached_threshold(mem in 0u64..200_000) {
        let expected = TIER_TABLE
            .iter()
            .find(|(threshold, _)| mem >= *threshold)
            .map_or(BatchTier::C, |(_, tier)| *tier);
        prop_assert_eq!(BatchTier::for_memory(mem), expected);
    }

    /// Every reachable tier yields a configured, positive batch size.
    #[test]
    fn prop_default_batch_size_positive(mem in any::<u64>()) {
        prop_assert!(BatchSizes::default().for_tier(BatchTier::for_memory(mem)) >= 1);
    }

    /// Indices are dense and follow line order regardless of unreadable entries.
    #[test]
    fn prop_inventory_indices_are_dense(
        values in prop::collection::vec(prop_oneof![
            (0u64..200_000).prop_map(|v| v.to_string()),
            Just("[N/A]".to_string()),
        ], 0..8)
    ) {
        let report = values.join("\n");
        let (devices, unreadable) = parse_memory_report(&report);
        prop_assert_eq!(devices.len(), values.len());
        for (i, device) in devices.iter().enumerate() {
            prop_assert_eq!(device.index, i);
        }
        prop_assert_eq!(
            unreadable.len(),
            devices.iter().filter(|d| d.memory_mib.is_none()).count()
        );
    }

    /// Any printable secret survives being written to and read from the profile.
    #[test]
    fn prop_profile_line_preserves_value(value in "[ -~]{0,40}") {
        let line = format_export("R2_SECRET_ACCESS_KEY", &value);
        let parsed = parse_export(&line).expect("own output parses");
        prop_assert_eq!(parsed.1, value);
    }
}
