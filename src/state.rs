//! Which guild and channel the user is currently in.
//!
//! The dispatcher is the only writer. The event renderer, the prompt and
//! the typing throttle read it concurrently.

use std::sync::{PoisonError, RwLock};

use crate::platform::{ChannelId, GuildId};

/// A consistent snapshot of the session location.
///
/// `channel_name` is non-empty exactly when `channel_id` is set. `guild_id`
/// may be unset while a channel is set (direct messages have no guild).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub channel_name: String,
}

/// Lock-guarded session location, shared by reference across tasks.
#[derive(Debug, Default)]
pub struct SessionState {
    location: RwLock<Location>,
}

impl SessionState {
    /// Starts outside of any guild or channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all three fields as one snapshot.
    pub fn read(&self) -> Location {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces all three fields together.
    ///
    /// An empty `channel_name` is replaced by the channel ID so the name is
    /// never empty while a channel is set.
    pub fn set(&self, guild_id: Option<GuildId>, channel_id: ChannelId, channel_name: &str) {
        let channel_name = if channel_name.is_empty() {
            channel_id.to_string()
        } else {
            channel_name.to_string()
        };

        let next = Location {
            guild_id,
            channel_id: Some(channel_id),
            channel_name,
        };
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .guild_id
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .channel_id
    }
}
