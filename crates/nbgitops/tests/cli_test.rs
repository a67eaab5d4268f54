//! Integration tests for the `nbgitops` binary.
//!
//! None of these reach a management API: they cover argument parsing and
//! startup validation, which fail before any network traffic.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const ENV_VARS: &[&str] = &[
    "GIT_REPO_URL",
    "GIT_RELATIVE_PATH",
    "GIT_BRANCH",
    "GIT_AUTH_METHOD",
    "GIT_USERNAME",
    "GIT_PASSWORD",
    "GIT_PRIVATE_KEY_PATH",
    "GIT_PRIVATE_KEY_PASSWORD",
    "NETBIRD_TOKEN",
    "NETBIRD_MANAGEMENT_API",
    "NETBIRD_CA_CERT",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "RUST_LOG",
];

/// A command with every configuration variable removed from its environment.
fn nbgitops() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nbgitops");
    cmd.env("HOME", "/tmp/nbgitops-cli-test-nonexistent");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Help & version ──────────────────────────────────────────────────

#[test]
fn test_help_lists_every_setting() {
    nbgitops()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--git-repo-url"))
        .stdout(predicate::str::contains("--netbird-mgmt-api"))
        .stdout(predicate::str::contains("--sync-frequency"))
        .stdout(predicate::str::contains("--sync-and-exit"))
        .stdout(predicate::str::contains("--notify-services-path"));
}

#[test]
fn test_help_hides_secret_env_values() {
    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_super_secret")
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!combined_output(&output).contains("nbp_super_secret"));
}

#[test]
fn test_version() {
    nbgitops()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nbgitops"));
}

// ── Startup validation ──────────────────────────────────────────────

#[test]
fn test_missing_token_is_usage_error() {
    let output = nbgitops()
        .args([
            "--git-repo-url",
            "https://git.example.com/net/config.git",
            "--netbird-mgmt-api",
            "https://api.netbird.io",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--netbird-token is required"));
}

#[test]
fn test_missing_repo_url_is_usage_error() {
    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_x")
        .env("NETBIRD_MANAGEMENT_API", "https://api.netbird.io")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--git-repo-url is required"));
}

#[test]
fn test_unknown_auth_method_is_rejected() {
    nbgitops()
        .args(["--git-auth-method", "kerberos"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("kerberos"));
}

#[test]
fn test_ssh_key_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let key = dir.path().join("id_ed25519");

    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_x")
        .env("NETBIRD_MANAGEMENT_API", "https://api.netbird.io")
        .env("GIT_REPO_URL", "git@git.example.com:net/config.git")
        .env("GIT_AUTH_METHOD", "ssh")
        .env("GIT_PRIVATE_KEY_PATH", &key)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("id_ed25519"));
}

#[test]
fn test_missing_ca_cert_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let cert = dir.path().join("ca.pem");

    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_x")
        .env("NETBIRD_MANAGEMENT_API", "https://netbird.internal")
        .env("GIT_REPO_URL", "https://git.example.com/net/config.git")
        .env("NETBIRD_CA_CERT", &cert)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("ca.pem"));
}

#[test]
fn test_parent_relative_path_is_rejected() {
    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_x")
        .env("NETBIRD_MANAGEMENT_API", "https://api.netbird.io")
        .env("GIT_REPO_URL", "https://git.example.com/net/config.git")
        .env("GIT_RELATIVE_PATH", "../outside")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--git-relative-path"));
}

#[test]
fn test_invalid_sync_frequency_is_rejected() {
    nbgitops()
        .args(["--sync-frequency", "soon"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unreachable_repository_fails_sync_once() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-repo");

    let output = nbgitops()
        .env("NETBIRD_TOKEN", "nbp_x")
        .env("NETBIRD_MANAGEMENT_API", "http://127.0.0.1:9")
        .env("GIT_REPO_URL", missing.to_str().unwrap())
        .arg("--sync-and-exit")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Git repository error"));
}
