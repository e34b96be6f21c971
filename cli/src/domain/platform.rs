//! Host platform detection and per-platform install recipes.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The
//! caller supplies the OS family string and the contents of
//! `/etc/os-release`.

use crate::domain::error::BootstrapError;
use crate::domain::step::CommandSpec;
use crate::domain::version::PythonVersion;

/// Package-manager family the installers target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Debian, Ubuntu and derivatives (`apt-get`).
    Debian,
    /// macOS with Homebrew.
    MacOs,
}

/// Resolve the platform from `std::env::consts::OS` and `/etc/os-release`.
///
/// # Errors
///
/// Returns `BootstrapError::UnsupportedPlatform` for any other OS or Linux
/// distribution.
pub fn detect_platform(os_family: &str, os_release: Option<&str>) -> Result<Platform, BootstrapError> {
    match os_family {
        "macos" => Ok(Platform::MacOs),
        "linux" => {
            let content = os_release.ok_or_else(|| {
                BootstrapError::UnsupportedPlatform("linux without /etc/os-release".to_string())
            })?;
            let id = os_release_field(content, "ID").unwrap_or_default();
            let id_like = os_release_field(content, "ID_LIKE").unwrap_or_default();
            let debian_family = id_like
                .split_whitespace()
                .chain(std::iter::once(id.as_str()))
                .any(|f| f == "debian" || f == "ubuntu");
            if debian_family {
                Ok(Platform::Debian)
            } else {
                Err(BootstrapError::UnsupportedPlatform(format!(
                    "linux distribution '{}'",
                    if id.is_empty() { "unknown" } else { &id }
                )))
            }
        }
        other => Err(BootstrapError::UnsupportedPlatform(other.to_string())),
    }
}

/// Read a `KEY=value` field from os-release content, stripping quotes.
#[must_use]
pub fn os_release_field(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        (k == key).then(|| v.trim_matches(|c| c == '"' || c == '\'').to_string())
    })
}

// ── Tools ─────────────────────────────────────────────────────────────────────

/// System tools the environment stage guarantees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Git,
    /// The `node` runtime together with its `npm` package manager.
    Node,
    Pm2,
    Python(PythonVersion),
}

impl Tool {
    /// Human-readable step name.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Git => "git".to_string(),
            Self::Node => "node/npm".to_string(),
            Self::Pm2 => "pm2".to_string(),
            Self::Python(v) => format!("python {v}"),
        }
    }

    /// Presence probes; every one must exit 0 for the tool to count as installed.
    #[must_use]
    pub fn probes(&self) -> Vec<CommandSpec> {
        match self {
            Self::Git => vec![CommandSpec::new("git", ["--version"])],
            Self::Node => vec![
                CommandSpec::new("node", ["--version"]),
                CommandSpec::new("npm", ["--version"]),
            ],
            Self::Pm2 => vec![CommandSpec::new("pm2", ["--version"])],
            Self::Python(v) => vec![CommandSpec::new(&v.binary(), ["--version"])],
        }
    }

    /// Install recipe for `platform`. `elevate` prefixes system-wide commands
    /// with `sudo` (Debian only; Homebrew refuses to run as root).
    #[must_use]
    pub fn install_commands(&self, platform: Platform, elevate: bool) -> Vec<CommandSpec> {
        let apt_update = || apt_get(&["update"], elevate);
        let apt_install = |pkgs: &[&str]| apt_get(&[&["install", "-y"][..], pkgs].concat(), elevate);
        match (self, platform) {
            (Self::Git, Platform::Debian) => vec![apt_update(), apt_install(&["git"])],
            (Self::Git, Platform::MacOs) => vec![CommandSpec::new("brew", ["install", "git"])],
            (Self::Node, Platform::Debian) => vec![apt_update(), apt_install(&["nodejs", "npm"])],
            (Self::Node, Platform::MacOs) => vec![CommandSpec::new("brew", ["install", "node"])],
            (Self::Pm2, Platform::Debian) => {
                vec![CommandSpec::new("npm", ["install", "-g", "pm2"]).elevated(elevate)]
            }
            (Self::Pm2, Platform::MacOs) => vec![CommandSpec::new("npm", ["install", "-g", "pm2"])],
            (Self::Python(v), Platform::Debian) => {
                let bin = v.binary();
                let venv = format!("{bin}-venv");
                let dev = format!("{bin}-dev");
                vec![
                    apt_update(),
                    apt_install(&["software-properties-common"]),
                    CommandSpec::new("add-apt-repository", ["-y", "ppa:deadsnakes/ppa"])
                        .elevated(elevate),
                    apt_update(),
                    apt_install(&[bin.as_str(), venv.as_str(), dev.as_str()]),
                ]
            }
            (Self::Python(v), Platform::MacOs) => {
                vec![CommandSpec::new("brew", ["install".to_string(), format!("python@{v}")])]
            }
        }
    }
}

fn apt_get(args: &[&str], elevate: bool) -> CommandSpec {
    CommandSpec::new("apt-get", args.iter().copied()).elevated(elevate)
}
