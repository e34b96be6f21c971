//! Wallet identities: one primary coldkey plus one hotkey per device.

/// Which slot an identity fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Primary,
    Device(usize),
}

/// Registration state on the subnet registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Primary identities are never registered themselves.
    NotApplicable,
    Registered,
    /// The check or the registration call failed; the device is skipped.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub kind: IdentityKind,
    pub exists_locally: bool,
    pub registration: Registration,
}

impl Identity {
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registration == Registration::Registered
    }
}

/// Subnet a hotkey is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTarget {
    pub netuid: u16,
    pub network: String,
}

/// Deterministic hotkey name for device `index`, e.g. `miner_0`.
#[must_use]
pub fn hotkey_name(prefix: &str, index: usize) -> String {
    format!("{prefix}_{index}")
}

/// The primary identity followed by per-device identities in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySet {
    pub primary: Identity,
    pub devices: Vec<Identity>,
}

impl IdentitySet {
    /// Per-device identity for `index`, if one was provisioned.
    #[must_use]
    pub fn device(&self, index: usize) -> Option<&Identity> {
        self.devices
            .iter()
            .find(|id| id.kind == IdentityKind::Device(index))
    }

    /// Indices whose hotkey is registered.
    #[must_use]
    pub fn registered_indices(&self) -> Vec<usize> {
        self.devices
            .iter()
            .filter(|id| id.is_registered())
            .filter_map(|id| match id.kind {
                IdentityKind::Device(i) => Some(i),
                IdentityKind::Primary => None,
            })
            .collect()
    }

    /// All identities, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        std::iter::once(&self.primary).chain(&self.devices)
    }
}
