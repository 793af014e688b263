use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_HISTORY_LIMIT: u8 = 50;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// The platform returns at most this many messages per page.
const MAX_HISTORY_LIMIT: u16 = 100;

/// Settings in the `[cordline]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CordlineConfig {
    /// Bot or user token sent as the `Authorization` header.
    pub token: Option<String>,
    /// REST API base URL.
    pub api_base: Option<String>,
    /// Messages shown when joining a channel.
    pub history_limit: Option<u16>,
    /// Seconds between checks for new messages.
    pub poll_interval_secs: Option<u64>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/cordline/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cordline: CordlineConfig,
}

/// Options from the command line, which take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub history_limit: Option<u16>,
    pub poll_interval_secs: Option<u64>,
}

/// Configuration after merging CLI options, the file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub token: String,
    pub api_base: String,
    pub history_limit: u8,
    pub poll_interval: Duration,
}

/// No token was given on the command line, in the environment or in the
/// config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingToken;

impl fmt::Display for MissingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "missing token\n\n\
             Please provide it via:\n  \
             - CLI option: cordline --token <TOKEN>\n  \
             - Environment: CORDLINE_TOKEN\n  \
             - Config file: token in the [cordline] section of ~/.config/cordline/config.toml",
        )
    }
}

impl std::error::Error for MissingToken {}

/// Resolves configuration by merging CLI options with config file settings.
///
/// # Errors
///
/// Returns [`MissingToken`] if no token is configured anywhere.
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
) -> Result<ResolvedConfig> {
    let file = &config_file.cordline;

    let token = options
        .token
        .as_ref()
        .or(file.token.as_ref())
        .filter(|token| !token.trim().is_empty())
        .cloned()
        .ok_or(MissingToken)?;

    let api_base = options
        .api_base
        .as_ref()
        .or(file.api_base.as_ref())
        .map_or_else(|| DEFAULT_API_BASE.to_string(), Clone::clone);

    let history_limit = options
        .history_limit
        .or(file.history_limit)
        .map_or(DEFAULT_HISTORY_LIMIT, |limit| {
            let clamped = limit.clamp(1, MAX_HISTORY_LIMIT);
            u8::try_from(clamped).unwrap_or(DEFAULT_HISTORY_LIMIT)
        });

    let poll_interval_secs = options
        .poll_interval_secs
        .or(file.poll_interval_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
        .max(1);

    Ok(ResolvedConfig {
        token,
        api_base,
        history_limit,
        poll_interval: Duration::from_secs(poll_interval_secs),
    })
}

/// Loads the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/cordline/config.toml`
    /// or `~/.config/cordline/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    /// Loads the config file. A file that cannot be read counts as empty; a
    /// file that cannot be parsed is an error.
    pub fn load(&self) -> Result<ConfigFile> {
        let contents = match fs::read_to_string(&self.config_path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.config_path.display(),
                        error = %e,
                        "ignoring unreadable config file"
                    );
                }
                return Ok(ConfigFile::default());
            }
        };

        toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }
}
