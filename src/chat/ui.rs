//! Chat mode line formatting.

use chrono::{DateTime, Local, Utc};

use super::command::COMMANDS;
use crate::platform::{Channel, Guild, Invite, Message};
use crate::state::Location;
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 12-hour clock, e.g. "3:04PM".
const TIME_FORMAT: &str = "%-I:%M%p";

pub fn header() -> String {
    format!(
        "{} {} - Interactive Chat Mode",
        Style::header("cordline"),
        Style::version(format!("v{VERSION}"))
    )
}

pub fn welcome() -> &'static str {
    "Welcome. Try typing '/help'."
}

pub fn goodbye() -> String {
    Style::success("Goodbye!")
}

/// The live prompt prefix for the current location.
pub fn prompt(location: &Location) -> String {
    if location.channel_id.is_some() {
        format!("#{}> ", location.channel_name)
    } else {
        "> ".to_string()
    }
}

pub fn help() -> Vec<String> {
    let mut lines = vec![
        "To send a message, type it in directly.".to_string(),
        Style::header("Available commands"),
    ];
    for info in COMMANDS {
        let synopsis = if info.usage.is_empty() {
            info.name.to_string()
        } else {
            format!("{} {}", info.name, info.usage)
        };
        lines.push(format!(
            "  {}  {}",
            Style::command(format!("{synopsis:<32}")),
            Style::secondary(info.description)
        ));
    }
    lines
}

fn clock(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

/// `[time] name: content`
pub fn message_line(message: &Message) -> String {
    format!(
        "{} {}: {}",
        Style::timestamp(format!("[{}]", clock(message.timestamp))),
        Style::author(message.display_name()),
        message.content
    )
}

/// `[time] name: content (edited)`, stamped with the edit time.
pub fn edited_line(message: &Message) -> String {
    let time = message.edited_timestamp.unwrap_or(message.timestamp);
    format!(
        "{} {}: {} {}",
        Style::timestamp(format!("[{}]", clock(time))),
        Style::author(message.display_name()),
        message.content,
        Style::secondary("(edited)")
    )
}

pub fn typing_line(name: &str) -> String {
    Style::typing(format!("*{name} is typing.*"))
}

pub fn guild_line(guild: &Guild) -> String {
    format!("Guild {}: {:?}:", guild.id, guild.name)
}

pub fn channel_entry_line(channel: &Channel) -> String {
    format!("\t- {}: {:?}", channel.id, channel.name())
}

pub fn joined_invite_line(invite: &Invite) -> String {
    let (guild_name, guild_id) = invite
        .guild
        .as_ref()
        .map_or((String::new(), String::new()), |g| {
            (g.name.clone(), g.id.to_string())
        });
    let (channel_name, channel_id) = invite
        .channel
        .as_ref()
        .map_or((String::new(), String::new()), |c| {
            (c.name().to_string(), c.id.to_string())
        });

    Style::success(format!(
        "Joined guild {guild_name:?} ({guild_id}) into channel {channel_name:?} ({channel_id})."
    ))
}

pub fn invite_created_line(invite: &Invite) -> String {
    Style::success(format!("Invite created: {:?}", invite.code))
}

pub fn guild_created_line(guild: &Guild) -> String {
    Style::success(format!("Created guild {:?} ({}).", guild.name, guild.id))
}

pub fn channel_created_line(channel: &Channel) -> String {
    Style::success(format!(
        "Created channel {:?} ({}).",
        channel.name(),
        channel.id
    ))
}
