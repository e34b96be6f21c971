//! Launch planning: batch-size tiers and worker invocations per device.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::credentials::{BUCKET_NAME, Credentials};
use crate::domain::device::Device;
use crate::domain::identity::{Identity, RegistryTarget};

// ── Tiers ─────────────────────────────────────────────────────────────────────

/// Batch-size tier derived from device memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BatchTier {
    A,
    B,
    C,
}

/// Ordered threshold table, highest first. The first threshold the memory
/// reaches wins; anything below the last entry falls back to `C`.
pub const TIER_TABLE: &[(u64, BatchTier)] = &[
    (80_000, BatchTier::A),
    (40_000, BatchTier::B),
    (20_000, BatchTier::C),
];

impl BatchTier {
    #[must_use]
    pub fn for_memory(memory_mib: u64) -> Self {
        TIER_TABLE
            .iter()
            .find(|(threshold, _)| memory_mib >= *threshold)
            .map_or(Self::C, |(_, tier)| *tier)
    }
}

/// Batch size per tier. B and C default to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSizes {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self { a: 6, b: 3, c: 3 }
    }
}

impl BatchSizes {
    #[must_use]
    pub fn for_tier(&self, tier: BatchTier) -> u32 {
        match tier {
            BatchTier::A => self.a,
            BatchTier::B => self.b,
            BatchTier::C => self.c,
        }
    }
}

// ── Plans ─────────────────────────────────────────────────────────────────────

/// Static inputs shared by every plan of a run.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub wallet_name: String,
    pub project: String,
    pub target: RegistryTarget,
    pub batch_sizes: BatchSizes,
    pub process_prefix: String,
    /// Worker entrypoint, absolute.
    pub script: PathBuf,
    /// Interpreter inside the isolated environment.
    pub interpreter: PathBuf,
    /// Working directory of the worker (the checkout).
    pub cwd: PathBuf,
}

/// One supervised worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub device_index: usize,
    pub tier: BatchTier,
    pub batch_size: u32,
    pub process_name: String,
    pub script: PathBuf,
    pub interpreter: PathBuf,
    pub cwd: PathBuf,
    /// Worker arguments (passed after `--`).
    pub args: Vec<String>,
    /// Environment the worker starts with.
    pub env: Credentials,
}

/// Deterministic supervisor name for device `index`.
#[must_use]
pub fn process_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index}")
}

/// Why a device gets no worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("memory unknown")]
    UnknownMemory,
    #[error("no bucket name set")]
    MissingBucket,
}

/// Build the launch plan for one device.
///
/// No batch size is guessed from unknown memory, and no worker is started
/// without a bucket.
///
/// # Errors
///
/// Returns the `SkipReason` when the device cannot be planned.
pub fn plan(
    device: &Device,
    identity: &Identity,
    credentials: &Credentials,
    ctx: &LaunchContext,
) -> Result<LaunchPlan, SkipReason> {
    let memory = device.memory_mib.ok_or(SkipReason::UnknownMemory)?;
    let tier = BatchTier::for_memory(memory);
    let batch_size = ctx.batch_sizes.for_tier(tier);
    let bucket = credentials
        .get(BUCKET_NAME)
        .filter(|b| !b.trim().is_empty())
        .ok_or(SkipReason::MissingBucket)?;

    let args = vec![
        "--wallet.name".to_string(),
        ctx.wallet_name.clone(),
        "--wallet.hotkey".to_string(),
        identity.name.clone(),
        "--device".to_string(),
        format!("cuda:{}", device.index),
        "--subtensor.network".to_string(),
        ctx.target.network.clone(),
        "--netuid".to_string(),
        ctx.target.netuid.to_string(),
        "--batch_size".to_string(),
        batch_size.to_string(),
        "--project".to_string(),
        ctx.project.clone(),
        "--bucket".to_string(),
        bucket.to_string(),
    ];

    Ok(LaunchPlan {
        device_index: device.index,
        tier,
        batch_size,
        process_name: process_name(&ctx.process_prefix, device.index),
        script: ctx.script.clone(),
        interpreter: ctx.interpreter.clone(),
        cwd: ctx.cwd.clone(),
        args,
        env: credentials.clone(),
    })
}
