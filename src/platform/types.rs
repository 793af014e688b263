//! Data types exchanged with the chat platform.
//!
//! IDs are snowflakes: platform-assigned, non-zero, sortable by creation
//! time, and carried as decimal strings on the wire.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parses a decimal snowflake. Zero is reserved as "no ID" and rejected.
pub fn parse_snowflake(input: &str) -> Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        bail!("empty ID");
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        bail!("invalid ID {input:?}: expected decimal digits");
    }
    let value: u64 = input.parse()?;
    if value == 0 {
        bail!("invalid ID {input:?}: must be non-zero");
    }
    Ok(value)
}

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                parse_snowflake(s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = anyhow::Error;

            fn try_from(value: String) -> Result<Self> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A guild (server) ID.
    GuildId
);
snowflake!(
    /// A channel ID, for guild channels and direct conversations alike.
    ChannelId
);
snowflake!(
    /// A user ID.
    UserId
);
snowflake!(
    /// A message ID.
    MessageId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Absent for direct-message channels.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Channel {
    /// The raw channel name, empty when the platform gave none.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// A name that is never empty: unnamed channels display as their ID.
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// The `<#id>` token the platform renders as a channel link.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

impl User {
    /// The `<@id>` token the platform renders as a user mention.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A user's membership in one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
}

impl Member {
    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref().filter(|nick| !nick.is_empty())
    }
}

/// Member data attached to messages, without the user object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMember {
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author: User,
    #[serde(default)]
    pub member: Option<PartialMember>,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Per-guild nickname if present, else the global username.
    pub fn display_name(&self) -> &str {
        self.member
            .as_ref()
            .and_then(|m| m.nick.as_deref())
            .filter(|nick| !nick.is_empty())
            .unwrap_or(&self.author.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    #[serde(default)]
    pub guild: Option<Guild>,
    #[serde(default)]
    pub channel: Option<Channel>,
}

/// Options accepted when creating an invite.
///
/// Unknown keys are rejected so typos surface as parse errors instead of
/// being silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInviteData {
    /// Lifetime in seconds; 0 means never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    /// Maximum uses; 0 means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingStart {
    pub channel_id: ChannelId,
    pub timestamp: DateTime<Utc>,
    /// Missing when the platform could not resolve who is typing.
    pub member: Option<Member>,
}

/// An inbound event delivered by the platform session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MessageCreate(Message),
    MessageUpdate(Message),
    TypingStart(TypingStart),
}

impl Event {
    pub const fn channel_id(&self) -> ChannelId {
        match self {
            Self::MessageCreate(message) | Self::MessageUpdate(message) => message.channel_id,
            Self::TypingStart(typing) => typing.channel_id,
        }
    }
}
