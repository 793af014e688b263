#![allow(clippy::unwrap_used)]
//! Config priority contract tests.
//!
//! Priority order (highest to lowest):
//! 1. CLI arguments (and `CORDLINE_TOKEN`, which clap folds into them)
//! 2. Config file
//! 3. Built-in defaults

use cordline::config::{
    ConfigFile, ConfigManager, CordlineConfig, DEFAULT_API_BASE, DEFAULT_HISTORY_LIMIT,
    ResolveOptions, resolve_config,
};
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

fn make_config_with_defaults() -> ConfigFile {
    ConfigFile {
        cordline: CordlineConfig {
            token: Some("file-token".to_string()),
            api_base: Some("http://file.local".to_string()),
            history_limit: Some(25),
            poll_interval_secs: Some(10),
        },
    }
}

#[test]
fn test_cli_token_overrides_config_token() {
    let options = ResolveOptions {
        token: Some("cli-token".to_string()),
        ..ResolveOptions::default()
    };

    let resolved = resolve_config(&options, &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.token, "cli-token");
    assert_eq!(resolved.api_base, "http://file.local");
}

#[test]
fn test_config_values_used_without_cli() {
    let resolved =
        resolve_config(&ResolveOptions::default(), &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.token, "file-token");
    assert_eq!(resolved.history_limit, 25);
    assert_eq!(resolved.poll_interval, Duration::from_secs(10));
}

#[test]
fn test_cli_history_limit_overrides_config() {
    let options = ResolveOptions {
        history_limit: Some(5),
        ..ResolveOptions::default()
    };

    let resolved = resolve_config(&options, &make_config_with_defaults()).unwrap();

    assert_eq!(resolved.history_limit, 5);
}

#[test]
fn test_defaults_fill_unset_values() {
    let options = ResolveOptions {
        token: Some("t".to_string()),
        ..ResolveOptions::default()
    };

    let resolved = resolve_config(&options, &ConfigFile::default()).unwrap();

    assert_eq!(resolved.api_base, DEFAULT_API_BASE);
    assert_eq!(resolved.history_limit, DEFAULT_HISTORY_LIMIT);
}

#[test]
#[serial]
fn test_manager_reads_from_xdg_config_home() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("cordline");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[cordline]\ntoken = \"file-token\"\nhistory_limit = 25\n",
    )
    .unwrap();

    let original = std::env::var("XDG_CONFIG_HOME").ok();
    // SAFETY: serialized with other env-mutating tests
    unsafe { std::env::set_var("XDG_CONFIG_HOME", temp_dir.path()) };

    let loaded = ConfigManager::new().unwrap().load().unwrap();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    assert_eq!(loaded.cordline.token.as_deref(), Some("file-token"));
    assert_eq!(loaded.cordline.history_limit, Some(25));
}
