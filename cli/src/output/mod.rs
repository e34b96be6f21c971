//! Output formatting module

pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
}

impl OutputContext {
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }
        Self { styles }
    }

    /// Colors only on a terminal stdout, and never when `NO_COLOR` is set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Term::stdout().is_term() && std::env::var_os("NO_COLOR").is_none())
    }

    /// Print a success message prefixed with `✓`.
    pub fn success(&self, msg: &str) {
        println!("  {} {msg}", "✓".style(self.styles.success));
    }

    /// Print a warning message prefixed with `!`.
    pub fn warn(&self, msg: &str) {
        println!("  {} {msg}", "!".style(self.styles.warning));
    }

    /// Print a section header.
    pub fn header(&self, msg: &str) {
        println!("  {}", msg.style(self.styles.header));
    }

    /// Print a key-value pair with the key dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        println!("  {}  {value}", key.style(self.styles.dim));
    }
}
