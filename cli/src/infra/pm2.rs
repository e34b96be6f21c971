//! `Pm2Supervisor` — worker processes managed by pm2.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::{CommandRunner, ProcessSupervisor};
use crate::domain::launch::LaunchPlan;
use crate::domain::supervisor::{ProcessStatus, SupervisedProcess};
use crate::infra::command_runner::ensure_success;

const LIST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Pm2Supervisor<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> Pm2Supervisor<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    async fn pm2(&self, args: &[&str]) -> Result<()> {
        let output = self.runner.run("pm2", args).await?;
        ensure_success(&format!("pm2 {}", args.join(" ")), &output)
    }
}

#[derive(Deserialize)]
struct JlistEntry {
    name: String,
    #[serde(default)]
    pm2_env: Option<JlistEnv>,
}

#[derive(Deserialize)]
struct JlistEnv {
    #[serde(default)]
    status: Option<String>,
}

/// Parse `pm2 jlist` output. pm2 may print notices (some starting with
/// `[PM2]`) before the JSON array.
///
/// # Errors
///
/// Returns an error when no JSON array can be parsed.
pub fn parse_process_list(stdout: &str) -> Result<Vec<SupervisedProcess>> {
    let mut offset = 0;
    let mut last_err = None;
    for line in stdout.split_inclusive('\n') {
        if line.trim_start().starts_with('[') {
            match serde_json::from_str::<Vec<JlistEntry>>(stdout[offset..].trim()) {
                Ok(entries) => return Ok(entries.into_iter().map(into_process).collect()),
                Err(e) => last_err = Some(e),
            }
        }
        offset += line.len();
    }
    match last_err {
        Some(e) => Err(e).context("parsing pm2 jlist output"),
        None => anyhow::bail!("pm2 jlist printed no process list"),
    }
}

fn into_process(entry: JlistEntry) -> SupervisedProcess {
    let status = entry.pm2_env.and_then(|env| env.status);
    SupervisedProcess {
        name: entry.name,
        status: ProcessStatus::from_label(status.as_deref().unwrap_or("unknown")),
    }
}

/// `pm2 start` arguments for one plan.
#[must_use]
pub fn start_args(plan: &LaunchPlan) -> Vec<String> {
    let mut args = vec![
        "start".to_string(),
        plan.script.to_string_lossy().into_owned(),
        "--interpreter".to_string(),
        plan.interpreter.to_string_lossy().into_owned(),
        "--name".to_string(),
        plan.process_name.clone(),
        "--cwd".to_string(),
        plan.cwd.to_string_lossy().into_owned(),
        "--".to_string(),
    ];
    args.extend(plan.args.iter().cloned());
    args
}

impl<R: CommandRunner> ProcessSupervisor for Pm2Supervisor<'_, R> {
    async fn list(&self) -> Result<Vec<SupervisedProcess>> {
        let output = self
            .runner
            .run_with_timeout("pm2", &["jlist"], LIST_TIMEOUT)
            .await?;
        ensure_success("pm2 jlist", &output)?;
        parse_process_list(&String::from_utf8_lossy(&output.stdout))
    }

    async fn stop_all(&self) -> Result<()> {
        self.pm2(&["stop", "all"]).await
    }

    async fn delete_all(&self) -> Result<()> {
        self.pm2(&["delete", "all"]).await
    }

    async fn start(&self, plan: &LaunchPlan) -> Result<()> {
        let args = start_args(plan);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_env("pm2", &arg_refs, &plan.env.env_pairs())
            .await?;
        ensure_success(&format!("pm2 start {}", plan.process_name), &output)
    }
}
