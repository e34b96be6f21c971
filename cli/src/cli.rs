//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Provision a GPU host and launch one subnet worker per GPU
#[derive(Parser)]
#[command(name = "gpu-bootstrap", version)]
pub struct Cli {
    /// Debug mode (true/false): verbose logs and external command output
    #[arg(
        value_name = "DEBUG",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub debug: bool,

    /// Project label passed to every worker (defaults to the configured project)
    #[arg(value_name = "PROJECT")]
    pub project: Option<String>,
}

impl Cli {
    /// Execute the bootstrap run.
    ///
    /// # Errors
    ///
    /// Returns an error if any fatal stage fails.
    pub async fn run(self) -> Result<()> {
        let Cli { debug, project } = self;
        init_tracing(debug);
        let debug_flag = debug;
        tracing::debug!(debug = debug_flag, ?project, "starting");

        let app = AppContext::new(&AppFlags { debug })?;
        commands::bootstrap::run(&app, project.as_deref()).await
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked from DEBUG.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
