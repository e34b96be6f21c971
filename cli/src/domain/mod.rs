//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod credentials;
pub mod device;
pub mod error;
pub mod identity;
pub mod launch;
pub mod platform;
pub mod run;
pub mod step;
pub mod supervisor;
pub mod version;
pub mod workspace;

pub use config::{BootstrapConfig, validate_config};
pub use credentials::Credentials;
pub use device::Device;
pub use error::{BootstrapError, ConfigError};
pub use identity::{Identity, IdentityKind, IdentitySet, Registration, RegistryTarget};
pub use launch::{BatchTier, LaunchPlan};
pub use platform::{Platform, Tool};
pub use step::{CommandSpec, StepResult};
pub use supervisor::{ProcessStatus, SupervisedProcess};
pub use workspace::Workspace;
