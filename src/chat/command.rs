/// Prefix that turns a line into a command.
pub const COMMAND_MARKER: char = '/';

/// A built-in slash command, for help output and completion.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    /// Name including the marker (e.g. "/join")
    pub name: &'static str,
    /// Argument synopsis, empty when the command takes none
    pub usage: &'static str,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "/help",
        usage: "",
        description: "Show available commands",
    },
    CommandInfo {
        name: "/list",
        usage: "",
        description: "List guilds and their channels",
    },
    CommandInfo {
        name: "/join",
        usage: "<channelID>",
        description: "Join a channel by ID and show recent messages",
    },
    CommandInfo {
        name: "/join-invite",
        usage: "<inviteCode>",
        description: "Accept an invite and join its channel",
    },
    CommandInfo {
        name: "/create-invite",
        usage: "[channelID] [json]",
        description: "Create an invite for a channel",
    },
    CommandInfo {
        name: "/create-guild",
        usage: "<name>",
        description: "Create a new guild",
    },
    CommandInfo {
        name: "/create-channel",
        usage: "<name>",
        description: "Create a channel in the current guild",
    },
    CommandInfo {
        name: "/quit",
        usage: "",
        description: "Exit",
    },
];

/// A parsed slash command. Arguments are kept raw; each action validates
/// its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    List,
    Join(String),
    JoinInvite(String),
    CreateInvite(String),
    CreateGuild(String),
    CreateChannel(String),
    Quit,
    Unknown(String),
}

/// One completed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Message text, sent verbatim.
    Text(String),
    Command(SlashCommand),
}

/// Splits on the first whitespace run into a head and the remainder.
pub fn split_head(line: &str) -> (&str, &str) {
    line.split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim_start()))
}

pub fn parse_input(line: &str) -> Input {
    let (head, rest) = split_head(line);

    let Some(name) = head.strip_prefix(COMMAND_MARKER) else {
        return Input::Text(line.to_string());
    };

    let rest = rest.to_string();
    let command = match name {
        "help" => SlashCommand::Help,
        "list" => SlashCommand::List,
        "join" => SlashCommand::Join(rest),
        "join-invite" => SlashCommand::JoinInvite(rest),
        "create-invite" => SlashCommand::CreateInvite(rest),
        "create-guild" => SlashCommand::CreateGuild(rest),
        "create-channel" => SlashCommand::CreateChannel(rest),
        "quit" => SlashCommand::Quit,
        other => SlashCommand::Unknown(other.to_string()),
    };
    Input::Command(command)
}

/// Whether the loop should end instead of dispatching `line`.
pub fn is_exit(line: &str) -> bool {
    matches!(parse_input(line.trim()), Input::Command(SlashCommand::Quit))
}
