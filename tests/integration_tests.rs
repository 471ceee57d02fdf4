//! Integration tests for the cabfare CLI

mod common;

use std::path::Path;
use std::process::{Command, Output};

use common::{API_KEY, FakeUpstream, write_model};
use tempfile::TempDir;

fn cabfare(config_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cabfare"));
    command
        .arg("--config")
        .arg(config_dir.join("missing.toml"))
        .env_remove("RUST_LOG")
        .env_remove("CABFARE_ROUTING__API_KEY");
    command
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Run a command off the runtime so the loopback server keeps serving
async fn run(mut command: Command) -> Output {
    tokio::task::spawn_blocking(move || command.output().expect("Failed to execute command"))
        .await
        .unwrap()
}

/// Test that the CLI lists its subcommands
#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = cabfare(dir.path()).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["route", "estimate", "shell", "serve"] {
        assert!(stdout.contains(subcommand), "missing {subcommand} in:\n{stdout}");
    }
}

/// Test that a missing routing key fails before any request is made
#[test]
fn test_route_without_api_key() {
    let dir = TempDir::new().unwrap();
    let output = cabfare(dir.path())
        .args(["route", "Thane", "Kharghar Railway Station"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("Configuration error"));
}

/// Test that out-of-range passenger counts are rejected by argument parsing
#[test]
fn test_estimate_rejects_passenger_count() {
    let dir = TempDir::new().unwrap();
    let output = cabfare(dir.path())
        .args(["estimate", "Thane", "Kharghar", "--passengers", "7"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(combined(&output).contains("passenger count must be between 1 and 6"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_estimate_end_to_end() {
    let upstream = FakeUpstream::start().await;
    let dir = TempDir::new().unwrap();
    let model_path = write_model(dir.path());

    let mut command = cabfare(dir.path());
    command
        .env("CABFARE_GEOCODING__BASE_URL", &upstream.base_url)
        .env("CABFARE_ROUTING__BASE_URL", format!("{}/routing", upstream.base_url))
        .env("CABFARE_ROUTING__API_KEY", API_KEY)
        .env("CABFARE_MODEL__PATH", &model_path)
        .args([
            "estimate",
            "Thane",
            "Kharghar Railway Station",
            "--passengers",
            "2",
            "--payment",
            "card",
            "--improvement-charge",
            "0.5",
        ]);

    let output = run(command).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", combined(&output));
    assert!(stdout.contains("Distance: 15 km"));
    assert!(stdout.contains("Estimated Time: 30 mins"));
    assert!(stdout.contains("Estimated Fare: $31.85"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_route_unknown_place() {
    let upstream = FakeUpstream::start().await;
    let dir = TempDir::new().unwrap();

    let mut command = cabfare(dir.path());
    command
        .env("CABFARE_GEOCODING__BASE_URL", &upstream.base_url)
        .env("CABFARE_ROUTING__BASE_URL", format!("{}/routing", upstream.base_url))
        .env("CABFARE_ROUTING__API_KEY", API_KEY)
        .args(["route", "!@#$%^", "Thane"]);

    let output = run(command).await;
    assert!(!output.status.success());
    assert!(combined(&output).contains("Invalid location '!@#$%^'"));
    assert!(upstream.routing_calls().is_empty());
}
