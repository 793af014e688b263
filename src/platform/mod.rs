//! The chat platform seam.
//!
//! The session core only talks to the platform through [`Platform`] (network
//! calls) and [`Cache`] (synchronous lookups into the client's local
//! snapshot). [`HttpPlatform`] is the REST-backed implementation used by the
//! binary.

mod cache;
mod http;
mod types;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;

use crate::state::SessionState;

pub use cache::MemoryCache;
pub use http::{HttpPlatform, HttpPlatformConfig};
pub use types::{
    Channel, ChannelId, CreateInviteData, Event, Guild, GuildId, Invite, Member, Message,
    MessageId, PartialMember, TypingStart, User, UserId, parse_snowflake,
};

/// Stream of inbound platform events.
pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

/// Read-mostly snapshot of guilds, channels and members.
///
/// Lookups never touch the network and may be stale.
pub trait Cache: Send + Sync {
    /// Guilds in platform order.
    fn guilds(&self) -> Result<Vec<Guild>>;

    /// Channels of one guild in platform order.
    fn channels(&self, guild: GuildId) -> Result<Vec<Channel>>;

    /// Members of one guild known so far.
    fn members(&self, guild: GuildId) -> Result<Vec<Member>>;

    /// Asks the platform to look up members matching `query` in the
    /// background. Results land in the cache for later lookups.
    fn request_member_search(&self, guild: GuildId, query: &str);
}

/// Network operations of the platform session.
#[async_trait]
pub trait Platform: Send + Sync {
    fn cache(&self) -> &dyn Cache;

    async fn channel(&self, id: ChannelId) -> Result<Channel>;

    /// Most recent messages, newest first.
    async fn messages(&self, channel: ChannelId, limit: u8) -> Result<Vec<Message>>;

    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<Message>;

    /// Signals that the user is typing in `channel`.
    async fn typing(&self, channel: ChannelId) -> Result<()>;

    async fn join_invite(&self, code: &str) -> Result<Invite>;

    /// `None` is passed through to the platform, which rejects it.
    async fn create_invite(
        &self,
        channel: Option<ChannelId>,
        data: &CreateInviteData,
    ) -> Result<Invite>;

    async fn create_guild(&self, name: &str) -> Result<Guild>;

    /// `None` is passed through to the platform, which rejects it.
    async fn create_channel(&self, guild: Option<GuildId>, name: &str) -> Result<Channel>;

    /// Starts keeping the member list of `guild` up to date.
    async fn subscribe_members(&self, guild: GuildId) -> Result<()>;

    /// Inbound events. `state` tells sources that cannot subscribe to every
    /// channel which one the user is currently viewing.
    fn events(&self, state: Arc<SessionState>) -> EventStream;
}
