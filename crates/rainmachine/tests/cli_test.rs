//! Integration tests for the `rainmachine` binary.
//!
//! Parsing, help, completions and config handling run without any
//! controller; the end-to-end cases point `--host` at a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// The binary with every `RAINMACHINE_*` variable cleared and config
/// lookups pointed at `home`.
fn rainmachine_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rainmachine");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("RAINMACHINE_PROFILE")
        .env_remove("RAINMACHINE_HOST")
        .env_remove("RAINMACHINE_PORT")
        .env_remove("RAINMACHINE_EMAIL")
        .env_remove("RAINMACHINE_MAC")
        .env_remove("RAINMACHINE_OUTPUT")
        .env_remove("RAINMACHINE_TIMEOUT")
        .env_remove("RAINMACHINE_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let home = tempfile::tempdir().unwrap();
    let cmd = rainmachine_cmd(home.path());
    (home, cmd)
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn json_ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Mount the login + identity probes a local connection performs.
async fn mount_controller(server: &MockServer, hw: u8) {
    Mock::given(method("POST"))
        .and(path("/api/4/auth/login"))
        .respond_with(json_ok(json!({ "access_token": "tok", "expires_in": 3600 })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/provision/wifi"))
        .respond_with(json_ok(json!({ "macAddress": "aa:bb:cc:dd:ee:ff" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/apiVer"))
        .respond_with(json_ok(json!({ "apiVer": "4.5.0", "hwVer": hw, "swVer": "4.0.1144" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/provision/name"))
        .respond_with(json_ok(json!({ "name": "Backyard" })))
        .mount(server)
        .await;
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let port = server.address().port().to_string();
    let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
    tokio::task::spawn_blocking(move || {
        let home = tempfile::tempdir().unwrap();
        rainmachine_cmd(home.path())
            .env("RAINMACHINE_PASSWORD", "hunter2")
            .args(["--host", "127.0.0.1", "--port", &port, "--no-ssl"])
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_home, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_command_groups() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("RainMachine")
            .and(predicate::str::contains("zones"))
            .and(predicate::str::contains("programs"))
            .and(predicate::str::contains("restrictions")),
    );
}

#[test]
fn test_version_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rainmachine"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let (_home, mut cmd) = isolated();
    let output = cmd.arg("sprinkle").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Completions ─────────────────────────────────────────────────────

#[test]
fn test_completions_for_each_shell() {
    for (shell, marker) in [("bash", "rainmachine"), ("zsh", "#compdef"), ("fish", "complete")] {
        let (_home, mut cmd) = isolated();
        cmd.args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains(marker));
    }
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_ends_in_config_toml() {
    let (_home, mut cmd) = isolated();
    cmd.args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_config_show_masks_passwords() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("rainmachine");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        r#"
default_profile = "garden"

[profiles.garden]
kind = "local"
host = "192.168.1.101"
password = "super-secret"
"#,
    )
    .unwrap();

    let output = rainmachine_cmd(home.path())
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("192.168.1.101"), "{text}");
    assert!(text.contains("********"), "{text}");
    assert!(!text.contains("super-secret"), "{text}");
}

#[test]
fn test_no_controller_configured() {
    let (_home, mut cmd) = isolated();
    let output = cmd.args(["zones", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("No controller configured"));
}

#[test]
fn test_unknown_profile_is_not_found() {
    let (_home, mut cmd) = isolated();
    let output = cmd.args(["-p", "nope", "zones", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_bad_email_is_rejected_before_login() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .env("RAINMACHINE_PASSWORD", "x")
        .args(["--email", "not-an-address", "controllers"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("email"));
}

// ── Against a mock controller ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_zones_list_as_json() {
    let server = MockServer::start().await;
    mount_controller(&server, 3).await;
    Mock::given(method("GET"))
        .and(path("/api/4/zone"))
        .respond_with(json_ok(json!({ "zones": [
            { "uid": 2, "name": "Beds", "active": true, "state": 0 },
            { "uid": 1, "name": "Lawn", "active": true, "state": 1 },
            { "uid": 3, "name": "Spare", "active": false, "state": 0 }
        ]})))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "json", "zones", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let zones: Value = serde_json::from_slice(&output.stdout).unwrap();
    let uids: Vec<u64> = zones
        .as_array()
        .unwrap()
        .iter()
        .map(|z| z["uid"].as_u64().unwrap())
        .collect();
    assert_eq!(uids, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_controllers_lists_identity() {
    let server = MockServer::start().await;
    mount_controller(&server, 3).await;

    let output = run_against(&server, &["-o", "plain", "controllers"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "aa:bb:cc:dd:ee:ff");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generation_one_hourly_is_unsupported() {
    let server = MockServer::start().await;
    mount_controller(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/4/restrictions/hourly"))
        .respond_with(json_ok(json!({ "hourlyRestrictions": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["restrictions", "hourly"]).await;
    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reboot_requires_yes_when_not_interactive() {
    let server = MockServer::start().await;
    mount_controller(&server, 3).await;
    Mock::given(method("POST"))
        .and(path("/api/4/machine/reboot"))
        .respond_with(json_ok(json!({ "statusCode": 0, "message": "OK" })))
        .expect(1)
        .mount(&server)
        .await;

    let refused = run_against(&server, &["machine", "reboot"]).await;
    assert_eq!(refused.status.code(), Some(2));

    let confirmed = run_against(&server, &["-y", "machine", "reboot"]).await;
    assert!(confirmed.status.success(), "{}", combined_output(&confirmed));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_session_maps_to_auth_exit_code() {
    let server = MockServer::start().await;
    mount_controller(&server, 3).await;
    Mock::given(method("GET"))
        .and(path("/api/4/program"))
        .respond_with(json_ok(json!({ "statusCode": 2, "message": "Not Authenticated" })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["programs", "list"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
