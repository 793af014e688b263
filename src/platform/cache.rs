use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::types::{Channel, Guild, GuildId, Member};

#[derive(Debug, Default)]
struct Snapshot {
    guilds: Vec<Guild>,
    channels: HashMap<GuildId, Vec<Channel>>,
    members: HashMap<GuildId, Vec<Member>>,
}

/// In-memory guild/channel/member store shared between the network side,
/// which fills it, and the session core, which only reads it.
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: RwLock<Snapshot>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a guild and its channel list.
    pub fn insert_guild(&self, guild: Guild, channels: Vec<Channel>) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = guild.id;
        match snapshot.guilds.iter_mut().find(|g| g.id == id) {
            Some(existing) => *existing = guild,
            None => snapshot.guilds.push(guild),
        }
        snapshot.channels.insert(id, channels);
    }

    /// Adds or replaces one channel of an already cached guild.
    pub fn insert_channel(&self, channel: Channel) {
        let Some(guild) = channel.guild_id else {
            return;
        };
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let channels = snapshot.channels.entry(guild).or_default();
        match channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel,
            None => channels.push(channel),
        }
    }

    /// Merges members into a guild's list, replacing entries for known users.
    pub fn upsert_members(&self, guild: GuildId, members: impl IntoIterator<Item = Member>) {
        let mut snapshot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let known = snapshot.members.entry(guild).or_default();
        for member in members {
            match known.iter_mut().find(|m| m.user.id == member.user.id) {
                Some(existing) => *existing = member,
                None => known.push(member),
            }
        }
    }

    pub fn guilds(&self) -> Vec<Guild> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .guilds
            .clone()
    }

    pub fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .channels
            .get(&guild)
            .cloned()
            .ok_or_else(|| anyhow!("guild {guild} is not cached"))
    }

    pub fn members(&self, guild: GuildId) -> Result<Vec<Member>> {
        let snapshot = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if !snapshot.channels.contains_key(&guild) {
            return Err(anyhow!("guild {guild} is not cached"));
        }
        Ok(snapshot.members.get(&guild).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::platform::ChannelId;
    use crate::testing::{channel, guild, member};

    #[test]
    fn test_unknown_guild_is_an_error() {
        let cache = MemoryCache::new();
        assert!(cache.channels(GuildId::new(1)).is_err());
        assert!(cache.members(GuildId::new(1)).is_err());
    }

    #[test]
    fn test_insert_guild_keeps_order_and_replaces() {
        let cache = MemoryCache::new();
        cache.insert_guild(guild(1, "one"), vec![channel(10, 1, "a")]);
        cache.insert_guild(guild(2, "two"), vec![]);
        cache.insert_guild(guild(1, "uno"), vec![channel(11, 1, "b")]);

        let names: Vec<_> = cache.guilds().into_iter().map(|g| g.name).collect();
        assert_eq!(names, ["uno", "two"]);
        assert_eq!(cache.channels(GuildId::new(1)).unwrap()[0].id, ChannelId::new(11));
    }

    #[test]
    fn test_insert_channel_appends_to_guild() {
        let cache = MemoryCache::new();
        cache.insert_guild(guild(1, "one"), vec![channel(10, 1, "a")]);
        cache.insert_channel(channel(12, 1, "c"));
        cache.insert_channel(channel(10, 1, "renamed"));

        let channels = cache.channels(GuildId::new(1)).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name(), "renamed");
    }

    #[test]
    fn test_upsert_members_deduplicates_by_user() {
        let cache = MemoryCache::new();
        cache.insert_guild(guild(1, "one"), vec![]);
        assert!(cache.members(GuildId::new(1)).unwrap().is_empty());

        cache.upsert_members(GuildId::new(1), [member(5, "ann", None), member(6, "bob", None)]);
        cache.upsert_members(GuildId::new(1), [member(5, "ann", Some("Annie"))]);

        let members = cache.members(GuildId::new(1)).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].nick(), Some("Annie"));
    }
}
