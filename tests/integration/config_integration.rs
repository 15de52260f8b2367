//! Configuration loading from files and environment variables.

use pulse::config::{ConfigLoader, PulseConfig};
use pulse::{ProgressCallback, PulseError, ThrottlingProgressCallback};
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

// Environment variables are process-global; every loader call in this binary goes through here.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pulse.toml");
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

#[test]
fn test_load_from_toml_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let (_dir, path) = write_config(
        r#"
[throttle]
frequency_ms = 250
lock_timeout_seconds = 120

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.throttle.frequency_ms, 250);
    assert_eq!(config.throttle.lock_timeout_seconds, 120);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.output, "stderr");

    let callback: ThrottlingProgressCallback<u32> =
        ThrottlingProgressCallback::from_config(&config).unwrap();
    assert_eq!(callback.frequency_ms(), 250);
    assert_eq!(callback.lock_timeout_seconds(), 120);
}

#[test]
fn test_missing_file_is_an_error() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(PulseError::ConfigError(_))));
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let (_dir, path) = write_config(
        r#"
[throttle]
lock_timeout_seconds = 0
"#,
    );

    match ConfigLoader::load_from_file(&path) {
        Err(PulseError::ConfigError(msg)) => {
            assert!(msg.contains("lock_timeout_seconds"), "unexpected message: {msg}")
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn test_environment_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let (_dir, path) = write_config(
        r#"
[throttle]
frequency_ms = 250
"#,
    );

    std::env::set_var("PULSE__THROTTLE__FREQUENCY_MS", "75");
    let result = ConfigLoader::load_from_file(&path);
    std::env::remove_var("PULSE__THROTTLE__FREQUENCY_MS");

    let config = result.unwrap();
    assert_eq!(config.throttle.frequency_ms, 75);
}

#[test]
fn test_defaults_without_sources() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let config = ConfigLoader::load().unwrap();
    let defaults = PulseConfig::default();
    assert_eq!(config.throttle, defaults.throttle);
    assert_eq!(config.logging.level, defaults.logging.level);
}
