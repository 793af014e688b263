//! Interactive chat mode.
//!
//! A line-editor REPL: plain lines are sent as messages, slash commands
//! change the current channel or create things, and inbound events for the
//! current channel are printed as they arrive.

/// Slash command parsing.
pub mod command;
/// Suggestions for the partial input line.
pub mod complete;
/// Command execution.
pub mod dispatch;
mod editor;
/// Inbound event rendering.
pub mod render;
mod session;
/// Typing indicator throttling.
pub mod typing;
mod ui;

pub use session::{ChatSession, SessionConfig};
