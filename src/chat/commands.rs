//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the API.

use crate::types::SearchMode;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Change the live search mode for the following requests.
    Search(SearchMode),

    /// Toggle citations.
    Citations(bool),

    /// Print the conversation so far.
    History,

    /// Show the price table.
    Pricing,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use juriste::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/search auto").is_some());
/// assert!(parse_command("Qu'est-ce qu'un bail commercial ?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "search" => match argument {
            Some(arg) => match arg.parse::<SearchMode>() {
                Ok(mode) => ChatCommand::Search(mode),
                Err(_) => ChatCommand::Invalid("/search expects 'on', 'auto' or 'off'".to_string()),
            },
            None => ChatCommand::Invalid("/search requires a mode".to_string()),
        },
        "citations" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Citations(value),
            None => ChatCommand::Invalid("/citations expects 'on' or 'off'".to_string()),
        },
        "history" => ChatCommand::History,
        "pricing" | "prix" => ChatCommand::Pricing,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "oui" => Some(true),
        "off" | "false" | "no" | "non" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /search on|auto|off    Set the web search mode (off is fastest and cheapest)
  /citations on|off      Show or hide the sources of each answer
  /history               Print the conversation so far
  /pricing               Show token and search prices
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}
