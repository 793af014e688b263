//! Test doubles shared by the unit tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::io;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

use crate::output::LineSink;
use crate::platform::{
    Cache, Channel, ChannelId, CreateInviteData, EventStream, Guild, GuildId, Invite, Member,
    MemoryCache, Message, MessageId, Platform, User, UserId,
};
use crate::state::SessionState;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects written lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }
}

impl LineSink for MemorySink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        lock(&self.lines).push(line.to_string());
        Ok(())
    }
}

/// A [`MemoryCache`] that records member search requests.
#[derive(Debug, Default)]
pub struct MockCache {
    store: MemoryCache,
    searches: Mutex<Vec<(GuildId, String)>>,
}

impl Deref for MockCache {
    type Target = MemoryCache;

    fn deref(&self) -> &MemoryCache {
        &self.store
    }
}

impl Cache for MockCache {
    fn guilds(&self) -> Result<Vec<Guild>> {
        Ok(self.store.guilds())
    }

    fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        self.store.channels(guild)
    }

    fn members(&self, guild: GuildId) -> Result<Vec<Member>> {
        self.store.members(guild)
    }

    fn request_member_search(&self, guild: GuildId, query: &str) {
        lock(&self.searches).push((guild, query.to_string()));
    }
}

/// Scripted platform that records every call as a readable string.
#[derive(Default)]
pub struct MockPlatform {
    pub cache: MockCache,
    calls: Mutex<Vec<String>>,
    channels: Mutex<HashMap<ChannelId, Channel>>,
    history: Mutex<HashMap<ChannelId, Vec<Message>>>,
    invite: Mutex<Option<Invite>>,
    failures: Mutex<HashSet<String>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&self, channel: Channel) {
        lock(&self.channels).insert(channel.id, channel);
    }

    /// Newest first, as the platform returns it.
    pub fn set_history(&self, channel: ChannelId, messages: Vec<Message>) {
        lock(&self.history).insert(channel, messages);
    }

    pub fn set_invite(&self, invite: Invite) {
        *lock(&self.invite) = Some(invite);
    }

    /// Makes every later call to `op` fail with "`op` failed".
    pub fn fail(&self, op: &str) {
        lock(&self.failures).insert(op.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn calls_named(&self, op: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(' ').next() == Some(op))
            .collect()
    }

    pub fn member_searches(&self) -> Vec<(GuildId, String)> {
        lock(&self.cache.searches).clone()
    }

    fn record(&self, op: &str, args: String) -> Result<()> {
        lock(&self.calls).push(format!("{op} {args}"));
        if lock(&self.failures).contains(op) {
            return Err(anyhow!("{op} failed"));
        }
        Ok(())
    }

    fn next_id(&self) -> u64 {
        1000 + lock(&self.calls).len() as u64
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn cache(&self) -> &dyn Cache {
        &self.cache
    }

    async fn channel(&self, id: ChannelId) -> Result<Channel> {
        self.record("channel", id.to_string())?;
        lock(&self.channels)
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown channel {id}"))
    }

    async fn messages(&self, channel: ChannelId, limit: u8) -> Result<Vec<Message>> {
        self.record("messages", format!("{channel} {limit}"))?;
        let history = lock(&self.history);
        Ok(history
            .get(&channel)
            .map(|messages| messages.iter().take(limit.into()).cloned().collect())
            .unwrap_or_default())
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<Message> {
        self.record("send_message", format!("{channel} {content}"))?;
        Ok(message(self.next_id(), channel.get(), "me", content))
    }

    async fn typing(&self, channel: ChannelId) -> Result<()> {
        self.record("typing", channel.to_string())
    }

    async fn join_invite(&self, code: &str) -> Result<Invite> {
        self.record("join_invite", code.to_string())?;
        lock(&self.invite)
            .clone()
            .ok_or_else(|| anyhow!("unknown invite {code}"))
    }

    async fn create_invite(
        &self,
        channel: Option<ChannelId>,
        data: &CreateInviteData,
    ) -> Result<Invite> {
        let json = serde_json::to_string(data)?;
        self.record(
            "create_invite",
            format!("{:?} {json}", channel.map(ChannelId::get)),
        )?;
        let channel = channel.ok_or_else(|| anyhow!("no channel to invite to"))?;
        Ok(Invite {
            code: format!("inv-{channel}"),
            guild: None,
            channel: None,
        })
    }

    async fn create_guild(&self, name: &str) -> Result<Guild> {
        self.record("create_guild", name.to_string())?;
        Ok(guild(self.next_id(), name))
    }

    async fn create_channel(&self, guild: Option<GuildId>, name: &str) -> Result<Channel> {
        self.record(
            "create_channel",
            format!("{:?} {name}", guild.map(GuildId::get)),
        )?;
        let guild = guild.ok_or_else(|| anyhow!("no guild to create the channel in"))?;
        Ok(channel(self.next_id(), guild.get(), name))
    }

    async fn subscribe_members(&self, guild: GuildId) -> Result<()> {
        self.record("subscribe_members", guild.to_string())
    }

    fn events(&self, _state: Arc<SessionState>) -> EventStream {
        Box::pin(futures_util::stream::empty())
    }
}

pub fn guild(id: u64, name: &str) -> Guild {
    Guild {
        id: GuildId::new(id),
        name: name.to_string(),
    }
}

pub fn channel(id: u64, guild: u64, name: &str) -> Channel {
    Channel {
        id: ChannelId::new(id),
        guild_id: Some(GuildId::new(guild)),
        name: Some(name.to_string()),
    }
}

pub fn member(id: u64, username: &str, nick: Option<&str>) -> Member {
    Member {
        user: User {
            id: UserId::new(id),
            username: username.to_string(),
        },
        nick: nick.map(str::to_string),
    }
}

pub fn message(id: u64, channel: u64, username: &str, content: &str) -> Message {
    Message {
        id: MessageId::new(id),
        channel_id: ChannelId::new(channel),
        author: User {
            id: UserId::new(id + 10_000),
            username: username.to_string(),
        },
        member: None,
        content: content.to_string(),
        timestamp: Utc
            .with_ymd_and_hms(2024, 5, 1, 13, 5, 0)
            .single()
            .unwrap_or_else(Utc::now),
        edited_timestamp: None,
    }
}
