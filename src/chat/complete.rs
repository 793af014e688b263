//! Autocomplete for the input line.
//!
//! Suggestions come from the local cache only. Branches are tried in a
//! fixed order and the first that applies wins:
//!
//! 1. `/join <id-prefix>`: channel IDs across every cached guild
//! 2. `/<prefix>` as the first word: built-in commands
//! 3. `@<prefix>`: members of the current guild
//! 4. `#<prefix>`: channels of the current guild
//!
//! Cache errors yield no suggestions.

use super::command::{COMMAND_MARKER, COMMANDS};
use crate::platform::{Cache, GuildId};

const JOIN_COMMAND: &str = "join";
const MEMBER_MARKER: char = '@';
const CHANNEL_MARKER: char = '#';

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Text that replaces the word before the cursor
    pub text: String,
    pub description: String,
}

impl Suggestion {
    fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

/// The word immediately before the cursor (after the last whitespace).
pub fn word_before_cursor(before: &str) -> &str {
    before
        .rfind(char::is_whitespace)
        .map_or(before, |i| {
            let ws_len = before[i..].chars().next().map_or(1, char::len_utf8);
            &before[i + ws_len..]
        })
}

/// Suggestions for the text before the cursor, in cache order.
pub fn suggest(before: &str, cache: &dyn Cache, guild: Option<GuildId>) -> Vec<Suggestion> {
    let mut fields = before.split_whitespace();
    let Some(first) = fields.next() else {
        return Vec::new();
    };

    if is_join_command(first) {
        return channels_by_id_prefix(cache, fields.next().unwrap_or_default());
    }

    let word = word_before_cursor(before);
    if word.is_empty() {
        return Vec::new();
    }

    let is_first_word = word.len() == before.len();
    if is_first_word && word.starts_with(COMMAND_MARKER) {
        return commands_with_prefix(word);
    }

    let Some(guild) = guild else {
        return Vec::new();
    };

    if let Some(search) = word.strip_prefix(MEMBER_MARKER) {
        members_matching(cache, guild, search)
    } else if let Some(search) = word.strip_prefix(CHANNEL_MARKER) {
        channels_matching(cache, guild, search)
    } else {
        Vec::new()
    }
}

/// Whether `token` names the join-by-ID command, with or without the marker.
pub fn is_join_command(token: &str) -> bool {
    token.strip_prefix(COMMAND_MARKER).unwrap_or(token) == JOIN_COMMAND
}

fn channels_by_id_prefix(cache: &dyn Cache, prefix: &str) -> Vec<Suggestion> {
    let Ok(guilds) = cache.guilds() else {
        return Vec::new();
    };

    guilds
        .iter()
        .filter_map(|guild| cache.channels(guild.id).ok())
        .flatten()
        .filter_map(|channel| {
            let id = channel.id.to_string();
            id.starts_with(prefix)
                .then(|| Suggestion::new(id, format!("#{}", channel.name())))
        })
        .collect()
}

fn commands_with_prefix(word: &str) -> Vec<Suggestion> {
    COMMANDS
        .iter()
        .filter(|info| info.name.starts_with(word))
        .map(|info| Suggestion::new(info.name, info.description))
        .collect()
}

fn members_matching(cache: &dyn Cache, guild: GuildId, search: &str) -> Vec<Suggestion> {
    let Ok(members) = cache.members(guild) else {
        return Vec::new();
    };

    let lower = search.to_lowercase();
    let suggestions: Vec<_> = members
        .iter()
        .filter(|member| {
            has_prefix_ignore_case(&member.user.username, &lower)
                || member
                    .nick()
                    .is_some_and(|nick| has_prefix_ignore_case(nick, &lower))
        })
        .map(|member| {
            Suggestion::new(member.user.mention(), format!("@{}", member.user.username))
        })
        .collect();

    if suggestions.is_empty() {
        cache.request_member_search(guild, search);
    }
    suggestions
}

fn channels_matching(cache: &dyn Cache, guild: GuildId, search: &str) -> Vec<Suggestion> {
    let Ok(channels) = cache.channels(guild) else {
        return Vec::new();
    };

    let lower = search.to_lowercase();
    channels
        .iter()
        .filter(|channel| has_prefix_ignore_case(channel.name(), &lower))
        .map(|channel| Suggestion::new(channel.mention(), format!("#{}", channel.name())))
        .collect()
}

/// `lower_prefix` must already be lower-cased.
fn has_prefix_ignore_case(candidate: &str, lower_prefix: &str) -> bool {
    candidate.to_lowercase().starts_with(lower_prefix)
}
