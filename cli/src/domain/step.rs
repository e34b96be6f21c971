//! Outcome of a single provisioning step and the command descriptors steps run.

use std::fmt;

use crate::domain::error::BootstrapError;

/// Terminal outcome of one `ensure` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The probe passed; nothing was run.
    AlreadySatisfied,
    /// The install action ran and the probe now passes.
    Installed,
    /// The install action failed. The pipeline aborts on this.
    Failed(BootstrapError),
}

impl StepResult {
    /// Convert into a `Result`, surfacing `Failed` as its error.
    ///
    /// # Errors
    ///
    /// Returns the wrapped `BootstrapError` for `Failed`.
    pub fn into_result(self) -> Result<Self, BootstrapError> {
        match self {
            Self::Failed(err) => Err(err),
            other => Ok(other),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// An external program invocation: program name plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    #[must_use]
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Prefix the invocation with `sudo` when `elevate` is set.
    #[must_use]
    pub fn elevated(self, elevate: bool) -> Self {
        if !elevate {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_owned(),
            args,
        }
    }

    /// Borrowed argument list, in the shape `CommandRunner` expects.
    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
