use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::MissedTickBehavior;

use super::cache::MemoryCache;
use super::types::{
    Channel, ChannelId, CreateInviteData, Event, Guild, GuildId, Invite, Member, Message,
    MessageId, User,
};
use super::{Cache, EventStream, Platform};
use crate::state::SessionState;

/// Messages inspected per poll when looking for new and edited ones.
const POLL_WINDOW: u8 = 25;
const MEMBER_PAGE: u16 = 100;
const MEMBER_SEARCH_LIMIT: u16 = 25;

/// Connection settings for [`HttpPlatform`].
#[derive(Debug, Clone)]
pub struct HttpPlatformConfig {
    /// REST base URL, e.g. `https://discord.com/api/v10`
    pub api_base: String,
    pub token: String,
    /// How often the viewed channel is checked for new messages.
    pub poll_interval: Duration,
}

struct Inner {
    client: Client,
    config: HttpPlatformConfig,
    cache: MemoryCache,
    runtime: Handle,
}

/// REST-backed platform session.
///
/// Cheap to clone. The guild and channel cache is filled on
/// [`connect`](Self::connect); members are filled on subscription and search.
#[derive(Clone)]
pub struct HttpPlatform {
    inner: Arc<Inner>,
}

#[derive(Serialize)]
struct Content<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct Name<'a> {
    name: &'a str,
}

impl HttpPlatform {
    /// Validates the token and loads every guild with its channels.
    pub async fn connect(config: HttpPlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cordline/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        let platform = Self {
            inner: Arc::new(Inner {
                client,
                config,
                cache: MemoryCache::new(),
                runtime: Handle::current(),
            }),
        };

        let me: User = platform
            .get("/users/@me", &[])
            .await
            .context("failed to authenticate")?;
        tracing::debug!(user = %me.username, "authenticated");

        let guilds: Vec<Guild> = platform
            .get("/users/@me/guilds", &[])
            .await
            .context("failed to list guilds")?;
        for guild in guilds {
            let channels: Vec<Channel> = platform
                .get(&format!("/guilds/{}/channels", guild.id), &[])
                .await
                .with_context(|| format!("failed to list channels of guild {}", guild.id))?;
            platform.inner.cache.insert_guild(guild, channels);
        }

        Ok(platform)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{path}",
            self.inner.config.api_base.trim_end_matches('/')
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .header("Authorization", &self.inner.config.token)
            .send()
            .await
            .context("failed to reach the API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("API request failed with status {status}: {body}");
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.inner.client.get(self.url(path)).query(query);
        let response = self.send(request).await?;
        response.json().await.context("failed to decode response")
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = Url::parse(&self.url(path)).context("invalid API URL")?;
        self.post_url(url, body).await
    }

    async fn post_url<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.client.post(url).json(body);
        let response = self.send(request).await?;
        response.json().await.context("failed to decode response")
    }

    async fn search_members(&self, guild: GuildId, query: &str) -> Result<()> {
        let members: Vec<Member> = self
            .get(
                &format!("/guilds/{guild}/members/search"),
                &[
                    ("query", query.to_string()),
                    ("limit", MEMBER_SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;
        self.inner.cache.upsert_members(guild, members);
        Ok(())
    }
}

/// `/invites/{code}`, with the user-typed code escaped as one path segment.
fn invite_url(api_base: &str, code: &str) -> Result<Url> {
    let mut url = Url::parse(api_base.trim_end_matches('/')).context("invalid API URL")?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("API URL cannot have a path: {api_base}"))?
        .pop_if_empty()
        .extend(["invites", code]);
    Ok(url)
}

fn channel_path(channel: Option<ChannelId>) -> String {
    // A missing channel becomes ID 0, which the API rejects.
    format!("/channels/{}", channel.map_or(0, ChannelId::get))
}

impl Cache for HttpPlatform {
    fn guilds(&self) -> Result<Vec<Guild>> {
        Ok(self.inner.cache.guilds())
    }

    fn channels(&self, guild: GuildId) -> Result<Vec<Channel>> {
        self.inner.cache.channels(guild)
    }

    fn members(&self, guild: GuildId) -> Result<Vec<Member>> {
        self.inner.cache.members(guild)
    }

    fn request_member_search(&self, guild: GuildId, query: &str) {
        let platform = self.clone();
        let query = query.to_string();
        self.inner.runtime.spawn(async move {
            if let Err(e) = platform.search_members(guild, &query).await {
                tracing::debug!(error = %e, %guild, "member search failed");
            }
        });
    }
}

#[async_trait]
impl Platform for HttpPlatform {
    fn cache(&self) -> &dyn Cache {
        self
    }

    async fn channel(&self, id: ChannelId) -> Result<Channel> {
        self.get(&channel_path(Some(id)), &[]).await
    }

    async fn messages(&self, channel: ChannelId, limit: u8) -> Result<Vec<Message>> {
        self.get(
            &format!("{}/messages", channel_path(Some(channel))),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<Message> {
        self.post(
            &format!("{}/messages", channel_path(Some(channel))),
            &Content { content },
        )
        .await
    }

    async fn typing(&self, channel: ChannelId) -> Result<()> {
        let url = self.url(&format!("{}/typing", channel_path(Some(channel))));
        self.send(self.inner.client.post(url)).await?;
        Ok(())
    }

    async fn join_invite(&self, code: &str) -> Result<Invite> {
        let url = invite_url(&self.inner.config.api_base, code)?;
        let mut invite: Invite = self.post_url(url, &serde_json::json!({})).await?;

        // Invite payloads carry the guild separately from the channel.
        if let (Some(guild), Some(channel)) = (&invite.guild, &mut invite.channel) {
            if channel.guild_id.is_none() {
                channel.guild_id = Some(guild.id);
            }
        }
        if let Some(guild) = &invite.guild
            && let Ok(channels) = self
                .get::<Vec<Channel>>(&format!("/guilds/{}/channels", guild.id), &[])
                .await
        {
            self.inner.cache.insert_guild(guild.clone(), channels);
        }
        Ok(invite)
    }

    async fn create_invite(
        &self,
        channel: Option<ChannelId>,
        data: &CreateInviteData,
    ) -> Result<Invite> {
        self.post(&format!("{}/invites", channel_path(channel)), data)
            .await
    }

    async fn create_guild(&self, name: &str) -> Result<Guild> {
        let guild: Guild = self.post("/guilds", &Name { name }).await?;
        self.inner.cache.insert_guild(guild.clone(), Vec::new());
        Ok(guild)
    }

    async fn create_channel(&self, guild: Option<GuildId>, name: &str) -> Result<Channel> {
        let path = format!("/guilds/{}/channels", guild.map_or(0, GuildId::get));
        let channel: Channel = self.post(&path, &Name { name }).await?;
        self.inner.cache.insert_channel(channel.clone());
        Ok(channel)
    }

    async fn subscribe_members(&self, guild: GuildId) -> Result<()> {
        let members: Vec<Member> = self
            .get(
                &format!("/guilds/{guild}/members"),
                &[("limit", MEMBER_PAGE.to_string())],
            )
            .await?;
        self.inner.cache.upsert_members(guild, members);
        Ok(())
    }

    /// Polls the viewed channel. The first poll after a channel change only
    /// records what is already there.
    fn events(&self, state: Arc<SessionState>) -> EventStream {
        let platform = self.clone();
        let interval = platform.inner.config.poll_interval;

        Box::pin(async_stream::stream! {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut watcher = ChannelWatcher::default();

            loop {
                ticker.tick().await;
                let Some(channel) = state.channel_id() else {
                    continue;
                };

                let messages = match platform.messages(channel, POLL_WINDOW).await {
                    Ok(messages) => messages,
                    Err(e) => {
                        tracing::debug!(error = %e, %channel, "poll failed");
                        continue;
                    }
                };

                for event in watcher.observe(channel, messages) {
                    yield event;
                }
            }
        })
    }
}

/// Diffs successive snapshots of one channel's latest messages.
#[derive(Debug, Default)]
struct ChannelWatcher {
    channel: Option<ChannelId>,
    newest: Option<MessageId>,
    edits: HashMap<MessageId, Option<DateTime<Utc>>>,
}

impl ChannelWatcher {
    /// `messages` is newest first, as fetched.
    fn observe(&mut self, channel: ChannelId, messages: Vec<Message>) -> Vec<Event> {
        let baseline = self.channel != Some(channel);
        if baseline {
            self.channel = Some(channel);
            self.newest = None;
            self.edits.clear();
        }

        let mut events = Vec::new();
        let mut edits = HashMap::with_capacity(messages.len());
        for message in messages.into_iter().rev() {
            edits.insert(message.id, message.edited_timestamp);
            if baseline {
                self.newest = self.newest.max(Some(message.id));
                continue;
            }

            if self.newest.is_none_or(|newest| message.id > newest) {
                self.newest = Some(message.id);
                events.push(Event::MessageCreate(message));
            } else if self
                .edits
                .get(&message.id)
                .is_some_and(|seen| *seen != message.edited_timestamp)
            {
                events.push(Event::MessageUpdate(message));
            }
        }
        self.edits = edits;
        events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::message;

    fn ids(events: &[Event]) -> Vec<(&'static str, u64)> {
        events
            .iter()
            .map(|e| match e {
                Event::MessageCreate(m) => ("create", m.id.get()),
                Event::MessageUpdate(m) => ("update", m.id.get()),
                Event::TypingStart(_) => ("typing", 0),
            })
            .collect()
    }

    #[test]
    fn test_watcher_baseline_is_silent() {
        let mut watcher = ChannelWatcher::default();
        let events = watcher.observe(
            ChannelId::new(1),
            vec![message(2, 1, "b", "two"), message(1, 1, "a", "one")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_watcher_reports_new_messages_oldest_first() {
        let mut watcher = ChannelWatcher::default();
        watcher.observe(ChannelId::new(1), vec![message(1, 1, "a", "one")]);

        let events = watcher.observe(
            ChannelId::new(1),
            vec![
                message(3, 1, "c", "three"),
                message(2, 1, "b", "two"),
                message(1, 1, "a", "one"),
            ],
        );
        assert_eq!(ids(&events), [("create", 2), ("create", 3)]);
    }

    #[test]
    fn test_watcher_reports_edits() {
        let mut watcher = ChannelWatcher::default();
        let original = message(1, 1, "a", "one");
        watcher.observe(ChannelId::new(1), vec![original.clone()]);

        let mut edited = original;
        edited.content = "one!".to_string();
        edited.edited_timestamp = Some(Utc::now());
        let events = watcher.observe(ChannelId::new(1), vec![edited.clone()]);
        assert_eq!(ids(&events), [("update", 1)]);

        let events = watcher.observe(ChannelId::new(1), vec![edited]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_watcher_ignores_older_messages_entering_window() {
        let mut watcher = ChannelWatcher::default();
        watcher.observe(ChannelId::new(1), vec![message(5, 1, "a", "five")]);

        // A deletion let an older message slide back into the window.
        let events = watcher.observe(
            ChannelId::new(1),
            vec![message(5, 1, "a", "five"), message(4, 1, "a", "four")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_watcher_resets_on_channel_change() {
        let mut watcher = ChannelWatcher::default();
        watcher.observe(ChannelId::new(1), vec![message(1, 1, "a", "one")]);

        let events = watcher.observe(ChannelId::new(2), vec![message(9, 2, "z", "nine")]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_invite_code_stays_in_one_segment() {
        let base = "https://chat.example/api/v10";
        assert_eq!(
            invite_url(base, "rust").unwrap().as_str(),
            "https://chat.example/api/v10/invites/rust"
        );
        assert_eq!(
            invite_url(base, "../users/@me").unwrap().as_str(),
            "https://chat.example/api/v10/invites/..%2Fusers%2F@me"
        );
        assert_eq!(
            invite_url("https://chat.example/api/v10/", "a b?c").unwrap().as_str(),
            "https://chat.example/api/v10/invites/a%20b%3Fc"
        );
    }

    #[test]
    fn test_channel_path_without_channel() {
        assert_eq!(channel_path(None), "/channels/0");
        assert_eq!(channel_path(Some(ChannelId::new(7))), "/channels/7");
    }
}
