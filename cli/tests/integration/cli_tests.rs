//! Integration tests for argument parsing and exit codes of the binary.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn gpu_bootstrap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gpu-bootstrap"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_positionals() {
    gpu_bootstrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("[DEBUG]"))
        .stdout(predicate::str::contains("[PROJECT]"));
}

#[test]
fn test_version_flag_shows_version() {
    gpu_bootstrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpu-bootstrap 0.1.0"));
}

#[test]
fn test_invalid_debug_value_exits_two() {
    gpu_bootstrap()
        .arg("maybe")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'maybe'"));
}

#[test]
fn test_extra_positional_is_rejected() {
    gpu_bootstrap()
        .args(["false", "proj", "extra"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_invalid_config_aborts_with_exit_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "worker:\n  batch_sizes:\n    a: 0\n").expect("write config");

    gpu_bootstrap()
        .env("GPU_BOOTSTRAP_CONFIG", &config)
        .env("HOME", dir.path())
        .env("GPU_BOOTSTRAP_YES", "1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("worker.batch_sizes.a"));
}
