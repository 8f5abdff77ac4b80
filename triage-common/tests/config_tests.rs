//! Integration tests for configuration resolution and loading
//!
//! Covers:
//! - Priority order for config file resolution (CLI > ENV > platform file)
//! - Missing config files fall back to compiled defaults
//! - Invalid config files are reported, not silently ignored
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TRIAGE_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use triage_common::config::{load_config, resolve_config_path, TomlConfig, CONFIG_ENV_VAR};

#[test]
#[serial]
fn test_cli_argument_takes_precedence_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/triage-from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/triage-from-cli.toml")), CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/triage-from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/triage-from-env.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/triage-from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_load_without_path_uses_defaults() {
    let config = load_config(None).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = load_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_full_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[server]
host = "0.0.0.0"
port = 8088

[model]
path = "/srv/models/tickets.json"

[routing]
auto_resolve_threshold = 0.9
human_review_threshold = 0.7

[metrics]
history_capacity = 0

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8088);
    assert_eq!(config.model.path, PathBuf::from("/srv/models/tickets.json"));
    assert_eq!(config.routing.auto_resolve_threshold, 0.9);
    assert_eq!(config.routing.human_review_threshold, 0.7);
    assert_eq!(config.metrics.capacity_limit(), None);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_invalid_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[routing]\nhuman_review_threshold = 0.95\n").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Configuration error"), "got: {}", message);
    assert!(message.contains("config.toml"), "got: {}", message);
}

#[test]
fn test_load_unparseable_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "this is = = not toml").unwrap();

    assert!(load_config(Some(&path)).is_err());
}
