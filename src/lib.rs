//! # cordline - terminal chat client
//!
//! `cordline` is an interactive chat client for Discord-style platforms:
//! guilds contain channels, channels contain messages. Plain lines are sent
//! to the current channel; slash commands switch channels and create things.
//!
//! ## Quick Start
//!
//! ```bash
//! CORDLINE_TOKEN=... cordline
//! > /list
//! > /join 123456789012345678
//! #general> hello
//! ```
//!
//! ## Configuration
//!
//! Settings are read from `~/.config/cordline/config.toml`:
//!
//! ```toml
//! [cordline]
//! token = "..."
//! history_limit = 50
//! poll_interval_secs = 3
//! ```

/// Interactive chat mode.
pub mod chat;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and option resolution.
pub mod config;

/// Serialized terminal output.
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Platform seam: traits, wire types and the REST adapter.
pub mod platform;

/// Where the user currently is.
pub mod state;

/// Terminal UI components (spinner, colors).
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
