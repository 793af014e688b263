//! Command implementations.

/// Chat session entry point.
pub mod chat;
