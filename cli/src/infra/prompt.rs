//! `DialoguerPrompter` — terminal prompts via `dialoguer`.

use std::io::IsTerminal as _;

use anyhow::Result;
use console::Term;
use dialoguer::{Confirm, Input, Password};

use crate::application::ports::Prompter;

/// Disables prompts when set (as does `CI`).
pub const YES_ENV: &str = "GPU_BOOTSTRAP_YES";

pub struct DialoguerPrompter {
    interactive: bool,
}

impl DialoguerPrompter {
    #[must_use]
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Interactive unless `CI` or `GPU_BOOTSTRAP_YES` is set, or stdin is
    /// not a terminal.
    #[must_use]
    pub fn from_env() -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var(YES_ENV).is_ok();
        Self::new(!ci_env && Term::stdout().is_term() && std::io::stdin().is_terminal())
    }
}

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;
        Ok(confirmed)
    }

    fn input(&self, prompt: &str, secret: bool) -> Result<String> {
        let value = if secret {
            Password::new().with_prompt(prompt).interact()?
        } else {
            Input::<String>::new().with_prompt(prompt).interact_text()?
        };
        Ok(value)
    }
}
