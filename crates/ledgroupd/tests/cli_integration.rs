//! Integration tests for the `ledgroupd-cli` binary.
//!
//! Offline subcommands (help, version, groups --config) run standalone; the
//! socket round-trip test spawns the `ledgroupd` service against a temporary
//! sysfs tree and drives it through the CLI.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("ledgroupd-cli")
}

const SAMPLE_CONFIG: &str = r#"{ "leds": [
    { "group": "enclosure_fault", "members": [
        { "Name": "front_fault", "Action": "On" },
        { "Name": "rear_fault", "Action": "On" } ] },
    { "group": "enclosure_identify", "members": [
        { "Name": "front_id", "Action": "Blink", "DutyOn": 50, "Period": 1000 } ] }
]}"#;

fn write_sample_config(dir: &Path) -> PathBuf {
    let path = dir.join("led-group-config.json");
    std::fs::write(&path, SAMPLE_CONFIG).unwrap();
    path
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgroupd-cli"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ── groups (offline, from config file) ──

#[test]
fn cli_groups_lists_configured_groups() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_sample_config(dir.path());

    cli()
        .args(["groups", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("enclosure_fault"))
        .stdout(predicate::str::contains("enclosure_identify"))
        .stdout(predicate::str::contains("Blink (50% of 1000ms)"));
}

#[test]
fn cli_groups_json_produces_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_sample_config(dir.path());

    let output = cli()
        .args(["--json", "groups", "--config"])
        .arg(&config)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("groups --json should produce valid JSON");
    assert_eq!(json["count"], 2);
    assert_eq!(json["groups"][0]["name"], "enclosure_fault");
    assert_eq!(json["groups"][0]["members"][0]["name"], "front_fault");
}

#[test]
fn cli_groups_missing_config_fails() {
    cli()
        .args(["groups", "--config", "/nonexistent/config.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn cli_status_without_service_fails() {
    cli()
        .args(["--socket", "/nonexistent/ledgroupd.sock", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ── Service round trip over the control socket ──

/// Kills the service on drop so a failing assertion cannot leak it.
struct Service(std::process::Child);

impl Drop for Service {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_service(dir: &Path) -> (Service, PathBuf) {
    let config = write_sample_config(dir);
    let socket = dir.join("ledgroupd.sock");
    let sysfs = dir.join("leds");
    for led in ["front_fault", "rear_fault", "front_id"] {
        let led_dir = sysfs.join(led);
        std::fs::create_dir_all(&led_dir).unwrap();
        for attr in ["trigger", "brightness", "delay_on", "delay_off"] {
            std::fs::write(led_dir.join(attr), "").unwrap();
        }
    }

    let child = std::process::Command::new(env!("CARGO_BIN_EXE_ledgroupd"))
        .arg("--config")
        .arg(&config)
        .arg("--socket")
        .arg(&socket)
        .arg("--state-file")
        .arg(dir.join("saved-groups.json"))
        .arg("--sysfs-base")
        .arg(&sysfs)
        .spawn()
        .expect("service binary should spawn");

    // Wait for the service to bind its socket.
    let deadline = Instant::now() + Duration::from_secs(10);
    while !socket.exists() {
        assert!(Instant::now() < deadline, "service never bound its socket");
        std::thread::sleep(Duration::from_millis(20));
    }
    (Service(child), socket)
}

fn cli_on(socket: &Path) -> assert_cmd::Command {
    let mut cmd = cli();
    cmd.arg("--socket").arg(socket);
    cmd
}

#[test]
fn service_round_trip_assert_status_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (_service, socket) = spawn_service(dir.path());

    cli_on(&socket)
        .args(["assert", "enclosure_fault"])
        .assert()
        .success()
        .stdout(predicate::str::contains("asserted"));

    // Hardware writes landed in the fake sysfs tree.
    let brightness = dir.path().join("leds/front_fault/brightness");
    assert_eq!(std::fs::read_to_string(brightness).unwrap(), "255");

    let output = cli_on(&socket)
        .args(["--json", "status"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let status: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(status["asserted"][0], "enclosure_fault");
    assert_eq!(status["settled"], true);

    // Unknown groups are rejected by the service, not the CLI.
    cli_on(&socket)
        .args(["assert", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown LED group 'nope'"));

    cli_on(&socket)
        .arg("clear-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("De-asserted 1 group(s)."));

    let brightness = dir.path().join("leds/front_fault/brightness");
    assert_eq!(std::fs::read_to_string(brightness).unwrap(), "0");

    cli_on(&socket)
        .arg("clear-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("No groups asserted."));
}

#[test]
fn service_groups_listed_over_socket() {
    let dir = tempfile::tempdir().unwrap();
    let (_service, socket) = spawn_service(dir.path());

    cli_on(&socket)
        .arg("groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("enclosure_fault"))
        .stdout(predicate::str::contains("enclosure_identify"));
}
