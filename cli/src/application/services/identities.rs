//! Application service — identity provisioning.
//!
//! One primary wallet plus one hotkey per device. Local creation failures
//! are fatal; registration is best-effort per index.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, RegistryClient, WalletStore};
use crate::domain::error::BootstrapError;
use crate::domain::identity::{
    Identity, IdentityKind, IdentitySet, Registration, RegistryTarget, hotkey_name,
};

/// Naming and registry inputs for `ensure_identities`.
pub struct IdentityOptions<'a> {
    pub wallet: &'a str,
    pub hotkey_prefix: &'a str,
    pub target: &'a RegistryTarget,
}

/// Ensure the primary wallet and one hotkey per device in `indices` exist
/// locally, and that every such hotkey is registered on the target subnet.
///
/// Hotkey names derive from the device index, so skipped indices leave gaps
/// rather than shifting later names.
///
/// A failed registration check or registration call marks that index
/// `Registration::Failed` and moves on to the next index.
///
/// # Errors
///
/// Returns an error if a wallet or hotkey cannot be checked or created.
pub async fn ensure_identities(
    wallets: &impl WalletStore,
    registry: &impl RegistryClient,
    reporter: &impl ProgressReporter,
    opts: &IdentityOptions<'_>,
    indices: &[usize],
) -> Result<IdentitySet> {
    let wallet = opts.wallet;
    if wallets.primary_exists(wallet).await? {
        reporter.success(&format!("wallet '{wallet}' present"));
    } else {
        reporter.step(&format!("creating wallet '{wallet}'..."));
        wallets
            .create_primary(wallet)
            .await
            .with_context(|| format!("creating wallet '{wallet}'"))?;
        reporter.success(&format!("wallet '{wallet}' created"));
    }
    let primary = Identity {
        name: wallet.to_string(),
        kind: IdentityKind::Primary,
        exists_locally: true,
        registration: Registration::NotApplicable,
    };

    let mut devices = Vec::with_capacity(indices.len());
    for &index in indices {
        let name = hotkey_name(opts.hotkey_prefix, index);
        if !wallets.hotkey_exists(wallet, &name).await? {
            reporter.step(&format!("creating hotkey '{name}'..."));
            wallets
                .create_hotkey(wallet, &name)
                .await
                .with_context(|| format!("creating hotkey '{name}'"))?;
        }

        let registration =
            match ensure_registered(registry, reporter, wallet, &name, opts.target).await {
                Ok(()) => Registration::Registered,
                Err(e) => {
                    let reason = format!("{e:#}");
                    let err = BootstrapError::RegistrationFailed {
                        identity: name.clone(),
                        reason: reason.clone(),
                    };
                    reporter.warn(&format!("{err}; GPU {index} will be skipped"));
                    Registration::Failed(reason)
                }
            };

        devices.push(Identity {
            name,
            kind: IdentityKind::Device(index),
            exists_locally: true,
            registration,
        });
    }

    Ok(IdentitySet { primary, devices })
}

async fn ensure_registered(
    registry: &impl RegistryClient,
    reporter: &impl ProgressReporter,
    wallet: &str,
    hotkey: &str,
    target: &RegistryTarget,
) -> Result<()> {
    if registry
        .is_registered(wallet, hotkey, target)
        .await
        .context("checking registration")?
    {
        reporter.success(&format!("hotkey '{hotkey}' registered on netuid {}", target.netuid));
        return Ok(());
    }
    reporter.step(&format!(
        "registering hotkey '{hotkey}' on netuid {} (this can take a while)...",
        target.netuid
    ));
    registry.register(wallet, hotkey, target).await?;
    reporter.success(&format!("hotkey '{hotkey}' registered"));
    Ok(())
}
