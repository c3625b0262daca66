//! Special commands parser for interactive chat mode
//!
//! Special commands are prefixed with `/` and are case-insensitive. Bare
//! `exit` and `quit` also end the session. Everything else is a message for
//! the teddy bear.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Capture one spoken message
    Voice,

    /// Show session status
    ShowStatus,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input as a message
    None,
}

/// Parse a line of chat input
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for unrecognized `/` commands
///
/// # Examples
///
/// ```
/// use teddy::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/voice").unwrap(), SpecialCommand::Voice);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/voice" | "/speak" | "/listen" => Ok(SpecialCommand::Voice),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the list of special commands
pub fn print_help() {
    use colored::Colorize;

    println!("\n{}", "Special commands:".bold());
    println!("  {}   Speak a message instead of typing it", "/voice".cyan());
    println!("  {}  Show session status", "/status".cyan());
    println!("  {}    Show this help", "/help".cyan());
    println!("  {}    Leave the conversation (also 'exit' or 'quit')\n", "/quit".cyan());
}
