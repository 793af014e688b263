//! Styling helpers for terminal output, built on owo-colors.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers ("Available commands")
    pub fn header<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    /// Message timestamps
    pub fn timestamp<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    /// Message author names
    pub fn author<T: Display>(text: T) -> String {
        format!("{}", text.cyan())
    }

    /// Secondary text: IDs, descriptions, "(edited)"
    pub fn secondary<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    /// Typing indicators
    pub fn typing<T: Display>(text: T) -> String {
        format!("{}", text.dimmed().italic())
    }

    /// Confirmation messages
    pub fn success<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    /// Error labels
    pub fn error<T: Display>(text: T) -> String {
        format!("{}", text.red().bold())
    }

    /// Slash commands ("/join")
    pub fn command<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    /// Version info
    pub fn version<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }
}
