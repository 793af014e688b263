//! XDG-style path utilities for configuration and cache directories.
//!
//! XDG Base Directory conventions are preferred over OS-specific locations
//! on every platform.

use anyhow::{Result, anyhow};
use std::path::PathBuf;

const APP_DIR: &str = "cordline";

/// Returns the configuration directory for cordline.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/cordline` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/cordline` otherwise
pub fn config_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns the cache directory for cordline.
///
/// Resolution order:
/// 1. `$XDG_CACHE_HOME/cordline` if `XDG_CACHE_HOME` is set
/// 2. `~/.cache/cordline` otherwise
pub fn cache_dir() -> Result<PathBuf> {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

/// Input history of the chat prompt.
pub fn history_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("history.txt"))
}

fn xdg_dir(var: &str, fallback: &str) -> Result<PathBuf> {
    match std::env::var(var) {
        Ok(base) if !base.is_empty() => Ok(PathBuf::from(base).join(APP_DIR)),
        _ => {
            let home =
                dirs::home_dir().ok_or_else(|| anyhow!("failed to determine home directory"))?;
            Ok(home.join(fallback).join(APP_DIR))
        }
    }
}
