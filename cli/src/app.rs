//! Application context — unified state passed to every command handler.

use anyhow::Result;

use crate::infra::config::YamlConfigStore;
use crate::infra::state::StateManager;
use crate::output::OutputContext;

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Debug logging and echo of external command output.
    pub debug: bool,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()`.
pub struct AppContext {
    /// Terminal output context (colors).
    pub output: OutputContext,
    /// Set by the DEBUG argument.
    pub debug: bool,
    /// Configuration file.
    pub config_store: YamlConfigStore,
    /// Last-run record.
    pub state_mgr: StateManager,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `StateManager::new()` fails (home directory not found).
    pub fn new(flags: &AppFlags) -> Result<Self> {
        Ok(Self {
            output: OutputContext::from_env(),
            debug: flags.debug,
            config_store: YamlConfigStore::new(),
            state_mgr: StateManager::new()?,
        })
    }
}
