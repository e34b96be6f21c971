//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, terminal prompts, and the external tools the pipeline drives
//! (`nvidia-smi`, `btcli`, `pm2`).
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod btcli;
pub mod command_runner;
pub mod config;
pub mod gpu;
pub mod host;
pub mod pm2;
pub mod profile;
pub mod prompt;
pub mod state;
