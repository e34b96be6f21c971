//! Bittensor wallet and subnet-registry adapters.
//!
//! Wallet presence is read straight from the wallet directory; creation and
//! registration go through the `btcli` installed in the worker environment.
//! Registration status is read with the environment's Python and the
//! `bittensor` package.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RegistryClient, WalletStore};
use crate::domain::identity::RegistryTarget;
use crate::infra::command_runner::ensure_success;

const CHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// Prints `True` or `False`. Arguments: network, wallet, hotkey, netuid.
const REGISTRATION_CHECK: &str = "\
import sys
import bittensor as bt
network, wallet, hotkey, netuid = sys.argv[1:5]
sub = bt.subtensor(network=network)
w = bt.wallet(name=wallet, hotkey=hotkey)
print(sub.is_hotkey_registered(netuid=int(netuid), hotkey_ss58=w.hotkey.ss58_address))
";

/// `~/.bittensor/wallets`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_wallets_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.join(".bittensor").join("wallets"))
}

// ── Wallets ──────────────────────────────────────────────────────────────────

pub struct BtcliWallets<'a, R> {
    runner: &'a R,
    btcli: PathBuf,
    wallets_dir: PathBuf,
}

impl<'a, R: CommandRunner> BtcliWallets<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, btcli: PathBuf, wallets_dir: PathBuf) -> Self {
        Self {
            runner,
            btcli,
            wallets_dir,
        }
    }

    async fn create(&self, label: &str, args: &[&str]) -> Result<()> {
        let program = self.btcli.to_string_lossy();
        // Inherited stdio: the mnemonic is only ever shown here.
        let status = self.runner.run_status(&program, args).await?;
        anyhow::ensure!(status.success(), "btcli {label} failed ({status})");
        Ok(())
    }
}

impl<R: CommandRunner> WalletStore for BtcliWallets<'_, R> {
    async fn primary_exists(&self, wallet: &str) -> Result<bool> {
        Ok(self.wallets_dir.join(wallet).join("coldkeypub.txt").exists())
    }

    async fn create_primary(&self, wallet: &str) -> Result<()> {
        let dir = self.wallets_dir.to_string_lossy();
        self.create(
            "wallet new-coldkey",
            &[
                "wallet",
                "new-coldkey",
                "--wallet-name",
                wallet,
                "--wallet-path",
                &*dir,
                "--n-words",
                "12",
                "--no-use-password",
            ],
        )
        .await
    }

    async fn hotkey_exists(&self, wallet: &str, hotkey: &str) -> Result<bool> {
        Ok(self
            .wallets_dir
            .join(wallet)
            .join("hotkeys")
            .join(hotkey)
            .exists())
    }

    async fn create_hotkey(&self, wallet: &str, hotkey: &str) -> Result<()> {
        let dir = self.wallets_dir.to_string_lossy();
        self.create(
            "wallet new-hotkey",
            &[
                "wallet",
                "new-hotkey",
                "--wallet-name",
                wallet,
                "--hotkey",
                hotkey,
                "--wallet-path",
                &*dir,
                "--n-words",
                "12",
                "--no-use-password",
            ],
        )
        .await
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

pub struct BtcliRegistry<'a, R> {
    runner: &'a R,
    btcli: PathBuf,
    python: PathBuf,
    wallets_dir: PathBuf,
}

impl<'a, R: CommandRunner> BtcliRegistry<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, btcli: PathBuf, python: PathBuf, wallets_dir: PathBuf) -> Self {
        Self {
            runner,
            btcli,
            python,
            wallets_dir,
        }
    }
}

/// Read the check script's verdict from its last non-empty stdout line.
///
/// # Errors
///
/// Returns an error when the output holds neither `True` nor `False`.
pub fn parse_registration_check(stdout: &str) -> Result<bool> {
    match stdout.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
        Some("True") => Ok(true),
        Some("False") => Ok(false),
        other => anyhow::bail!("unexpected registration check output: {other:?}"),
    }
}

impl<R: CommandRunner> RegistryClient for BtcliRegistry<'_, R> {
    async fn is_registered(
        &self,
        wallet: &str,
        hotkey: &str,
        target: &RegistryTarget,
    ) -> Result<bool> {
        let python = self.python.to_string_lossy();
        let netuid = target.netuid.to_string();
        let output = self
            .runner
            .run_with_timeout(
                &python,
                &[
                    "-c",
                    REGISTRATION_CHECK,
                    target.network.as_str(),
                    wallet,
                    hotkey,
                    netuid.as_str(),
                ],
                CHECK_TIMEOUT,
            )
            .await
            .context("running registration check")?;
        ensure_success("registration check", &output)?;
        parse_registration_check(&String::from_utf8_lossy(&output.stdout))
    }

    async fn register(&self, wallet: &str, hotkey: &str, target: &RegistryTarget) -> Result<()> {
        let btcli = self.btcli.to_string_lossy();
        let netuid = target.netuid.to_string();
        let dir = self.wallets_dir.to_string_lossy();
        let output = self
            .runner
            .run(
                &btcli,
                &[
                    "subnet",
                    "register",
                    "--netuid",
                    netuid.as_str(),
                    "--network",
                    target.network.as_str(),
                    "--wallet-name",
                    wallet,
                    "--hotkey",
                    hotkey,
                    "--wallet-path",
                    &*dir,
                    "--no-prompt",
                ],
            )
            .await?;
        ensure_success("btcli subnet register", &output)
    }
}
