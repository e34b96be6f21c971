//! `NvidiaSmi` — GPU memory query through the NVIDIA driver tool.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{CommandRunner, DeviceQuery};
use crate::infra::command_runner::ensure_success;

const QUERY_TIMEOUT: Duration = Duration::from_secs(60);

pub const QUERY_ARGS: &[&str] = &[
    "--query-gpu=memory.total",
    "--format=csv,noheader,nounits",
];

pub struct NvidiaSmi<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> NvidiaSmi<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> DeviceQuery for NvidiaSmi<'_, R> {
    async fn memory_report(&self) -> Result<String> {
        let output = self
            .runner
            .run_with_timeout("nvidia-smi", QUERY_ARGS, QUERY_TIMEOUT)
            .await?;
        ensure_success("nvidia-smi", &output)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
