//! Application service — credential store.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{ProfileStore, Prompter, ProgressReporter};
use crate::domain::credentials::{Credentials, is_secret};
use crate::domain::error::BootstrapError;

/// Resolve every credential in `names` from the persisted profile, collecting
/// and appending only the missing ones.
///
/// One confirmation gates collection; declining aborts the run. Existing
/// profile values are never rewritten, and an empty value counts as unset.
///
/// # Errors
///
/// Returns `UserAborted` when the user declines, `MissingCredentials` in
/// non-interactive mode, or an error if the profile cannot be read or written
/// or holds an `export` of a required name that cannot be parsed.
pub fn load_or_collect(
    store: &impl ProfileStore,
    prompter: &impl Prompter,
    reporter: &impl ProgressReporter,
    names: &[&str],
) -> Result<Credentials> {
    let location = store.location();
    let scan = store
        .read_entries()
        .with_context(|| format!("reading {}", location.display()))?;
    // Appending after a line the shell reads differently would shadow it.
    if let Some((name, line)) = scan.unreadable_for(names) {
        anyhow::bail!(
            "cannot read {name} from {}: `{line}`. Fix or remove that line and re-run.",
            location.display()
        );
    }
    let mut credentials: Credentials = names
        .iter()
        .filter_map(|name| {
            scan.entries
                .get(*name)
                .map(|value| ((*name).to_string(), value.clone()))
        })
        .collect();

    let missing = credentials.missing(names);
    if missing.is_empty() {
        reporter.success(&format!("credentials loaded from {}", location.display()));
        return Ok(credentials);
    }
    if !prompter.is_interactive() {
        return Err(BootstrapError::MissingCredentials(missing).into());
    }

    reporter.warn(&format!("missing credentials: {}", missing.join(", ")));
    let proceed = prompter.confirm(&format!(
        "Enter them now and save them to {}?",
        location.display()
    ))?;
    if !proceed {
        return Err(BootstrapError::UserAborted.into());
    }

    let mut collected = Vec::with_capacity(missing.len());
    for name in missing {
        let value = prompter.input(&name, is_secret(&name))?;
        let value = value.trim().to_string();
        anyhow::ensure!(!value.is_empty(), "{name} must not be empty");
        collected.push((name, value));
    }

    store
        .append(&collected)
        .with_context(|| format!("writing {}", location.display()))?;
    reporter.success(&format!(
        "saved {} credential(s) to {}",
        collected.len(),
        location.display()
    ));
    for (name, value) in collected {
        credentials.insert(name, value);
    }
    Ok(credentials)
}
