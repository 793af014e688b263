//! Executes one completed input line.
//!
//! Every action recovers its own errors: failures are printed as a single
//! `Error: <context>: <cause>` line and the session carries on.

use anyhow::{Context, Result, anyhow};
use std::sync::Arc;

use super::command::{Input, SlashCommand, parse_input, split_head};
use super::ui;
use crate::output::Output;
use crate::platform::{ChannelId, CreateInviteData, GuildId, Platform};
use crate::state::SessionState;

pub struct Dispatcher {
    client: Arc<dyn Platform>,
    state: Arc<SessionState>,
    output: Arc<Output>,
    history_limit: u8,
}

impl Dispatcher {
    pub fn new(
        client: Arc<dyn Platform>,
        state: Arc<SessionState>,
        output: Arc<Output>,
        history_limit: u8,
    ) -> Self {
        Self {
            client,
            state,
            output,
            history_limit,
        }
    }

    /// Runs the action for `line` to completion.
    pub async fn dispatch(&self, line: &str) {
        let result = match parse_input(line) {
            Input::Text(text) => self.send_message(&text).await,
            Input::Command(command) => self.run_command(command).await,
        };

        if let Err(e) = result {
            self.output.error(&e).await;
        }
    }

    async fn run_command(&self, command: SlashCommand) -> Result<()> {
        match command {
            SlashCommand::Help => {
                self.output.lines(ui::help()).await;
                Ok(())
            }
            SlashCommand::List => self.list().await,
            SlashCommand::Join(arg) => self.join(&arg).await,
            SlashCommand::JoinInvite(code) => self.join_invite(&code).await,
            SlashCommand::CreateInvite(arg) => self.create_invite(&arg).await,
            SlashCommand::CreateGuild(name) => self.create_guild(&name).await,
            SlashCommand::CreateChannel(name) => self.create_channel(&name).await,
            // The loop exits before dispatching /quit; unknown names are ignored.
            SlashCommand::Quit | SlashCommand::Unknown(_) => Ok(()),
        }
    }

    async fn send_message(&self, body: &str) -> Result<()> {
        let channel = self
            .state
            .channel_id()
            .ok_or_else(|| anyhow!("not in any channel"))?;

        if body.trim().is_empty() {
            return Err(anyhow!("missing message content"));
        }

        self.client
            .send_message(channel, body)
            .await
            .context("failed to send message")?;
        Ok(())
    }

    async fn list(&self) -> Result<()> {
        let cache = self.client.cache();
        let guilds = cache.guilds().context("failed to list all guilds")?;

        for guild in guilds {
            match cache.channels(guild.id) {
                Ok(channels) => {
                    let lines = std::iter::once(ui::guild_line(&guild))
                        .chain(channels.iter().map(ui::channel_entry_line));
                    self.output.lines(lines).await;
                }
                Err(e) => {
                    self.output
                        .error(&e.context("failed to get channels"))
                        .await;
                }
            }
        }
        Ok(())
    }

    async fn join(&self, arg: &str) -> Result<()> {
        let id: ChannelId = arg.parse().context("failed to parse channel ID")?;

        let channel = self
            .client
            .channel(id)
            .await
            .context("invalid channel")?;
        let mut messages = self
            .client
            .messages(id, self.history_limit)
            .await
            .context("failed to fetch messages")?;

        // Fetched newest first.
        messages.reverse();
        self.output
            .lines(messages.iter().map(ui::message_line))
            .await;

        self.state
            .set(channel.guild_id, id, &channel.display_name());

        if let Some(guild) = channel.guild_id {
            self.subscribe_members(guild);
        }
        Ok(())
    }

    fn subscribe_members(&self, guild: GuildId) {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(e) = client.subscribe_members(guild).await {
                tracing::debug!(error = %e, %guild, "member subscription failed");
            }
        });
    }

    async fn join_invite(&self, code: &str) -> Result<()> {
        let invite = self
            .client
            .join_invite(code.trim())
            .await
            .context("failed to join invite")?;

        if let Some(channel) = &invite.channel {
            let guild = invite.guild.as_ref().map(|g| g.id).or(channel.guild_id);
            self.state.set(guild, channel.id, &channel.display_name());
        }

        self.output.line(ui::joined_invite_line(&invite)).await;
        Ok(())
    }

    async fn create_invite(&self, arg: &str) -> Result<()> {
        let (channel_arg, data_arg) = split_head(arg.trim());

        let mut channel = self.state.channel_id();
        if !channel_arg.is_empty() {
            channel = Some(
                channel_arg
                    .parse()
                    .context("failed to parse channel ID")?,
            );
        }

        let data = if data_arg.is_empty() {
            CreateInviteData::default()
        } else {
            serde_json::from_str(data_arg).context("failed to parse invite data JSON")?
        };

        let invite = self
            .client
            .create_invite(channel, &data)
            .await
            .context("failed to create invite")?;

        self.output.line(ui::invite_created_line(&invite)).await;
        Ok(())
    }

    async fn create_guild(&self, name: &str) -> Result<()> {
        let guild = self
            .client
            .create_guild(name)
            .await
            .context("failed to create guild")?;

        self.output.line(ui::guild_created_line(&guild)).await;
        Ok(())
    }

    async fn create_channel(&self, name: &str) -> Result<()> {
        let channel = self
            .client
            .create_channel(self.state.guild_id(), name)
            .await
            .context("failed to create channel")?;

        self.output.line(ui::channel_created_line(&channel)).await;
        Ok(())
    }
}
