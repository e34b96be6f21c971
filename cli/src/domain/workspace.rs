//! Worker checkout layout and dependency-stamp logic.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Isolated environment directory inside the checkout.
pub const VENV_DIR: &str = ".venv";

/// Stamp file recording the manifest digest the environment was synced to.
pub const DEPS_STAMP: &str = ".gpu-bootstrap-deps";

/// A located worker checkout with its isolated environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub checkout: PathBuf,
}

impl Workspace {
    #[must_use]
    pub fn new(checkout: PathBuf) -> Self {
        Self { checkout }
    }

    #[must_use]
    pub fn venv(&self) -> PathBuf {
        self.checkout.join(VENV_DIR)
    }

    /// Executable inside the environment's `bin/` directory.
    #[must_use]
    pub fn bin(&self, name: &str) -> PathBuf {
        self.venv().join("bin").join(name)
    }

    /// The environment's interpreter.
    #[must_use]
    pub fn python(&self) -> PathBuf {
        self.bin("python")
    }

    #[must_use]
    pub fn stamp_path(&self) -> PathBuf {
        self.venv().join(DEPS_STAMP)
    }
}

/// Arguments to the environment interpreter that install `manifest`.
///
/// `*.txt` manifests are installed with `-r`; anything else (e.g.
/// `pyproject.toml`) installs the checkout itself in editable mode.
#[must_use]
pub fn pip_install_args(checkout: &Path, manifest: &Path) -> Vec<String> {
    let is_requirements = manifest
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
    if is_requirements {
        args.push("-r".to_string());
        args.push(checkout.join(manifest).to_string_lossy().into_owned());
    } else {
        args.push("-e".to_string());
        args.push(checkout.to_string_lossy().into_owned());
    }
    args
}

/// SHA-256 of the manifest contents, lowercase hex.
#[must_use]
pub fn manifest_digest(content: &[u8]) -> String {
    hex_encode(&Sha256::digest(content))
}

/// Encode bytes as lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
