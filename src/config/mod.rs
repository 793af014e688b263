//! Configuration file management and option resolution.

mod manager;

pub use manager::{
    ConfigFile, ConfigManager, CordlineConfig, DEFAULT_API_BASE, DEFAULT_HISTORY_LIMIT,
    DEFAULT_POLL_INTERVAL_SECS, MissingToken, ResolveOptions, ResolvedConfig, resolve_config,
};
