//! Runs the `pulse` binary end to end.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn pulse() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pulse"));
    command
        .env_remove("PULSE_LOG")
        .env_remove("PULSE_LOG_FORMAT")
        .env_remove("PULSE_LOG_OUTPUT")
        .env_remove("PULSE__THROTTLE__FREQUENCY_MS")
        .arg("--quiet");
    command
}

#[test]
fn test_simulate_completes() {
    let output = pulse()
        .args(["simulate", "--records", "200", "--work-micros", "0"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "pulse simulate should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Records processed: 200"), "stdout={stdout}");
    assert!(stdout.contains("Status: completed"), "stdout={stdout}");
}

#[test]
fn test_simulate_stops_when_listener_fails() {
    let output = pulse()
        .args([
            "simulate",
            "--records",
            "200",
            "--work-micros",
            "0",
            "--fail-after",
            "0",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Records processed: 1\n"), "stdout={stdout}");
    assert!(stdout.contains("Status: terminated"), "stdout={stdout}");
}

#[test]
fn test_config_command_reads_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pulse.toml");
    fs::write(&path, "[throttle]\nfrequency_ms = 333\n").unwrap();

    let output = pulse()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frequency_ms = 333"), "stdout={stdout}");
}

#[test]
fn test_invalid_config_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pulse.toml");
    fs::write(&path, "[throttle]\nlock_timeout_seconds = 0\n").unwrap();

    let output = pulse()
        .arg("--config")
        .arg(&path)
        .arg("config")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("lock_timeout_seconds"));
}

#[test]
fn test_invalid_log_flag_exits_with_error() {
    let output = pulse()
        .args(["--log-format", "yaml", "config"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid log format"));
}
