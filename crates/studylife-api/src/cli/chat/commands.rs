//! Slash commands for the chat loop.

use std::io::Write;
use std::path::PathBuf;

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Reprint the conversation so far.
    History,
    /// Send a file, optionally with a message.
    Attach { path: PathBuf, text: String },
    /// Toggle spoken replies.
    Voice,
    /// Dictate one message.
    Listen,
    Unknown(String),
}

/// Parse input as a slash command. `None` when it doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/history" => ChatCommand::History,
        "/voice" | "/tts" => ChatCommand::Voice,
        "/listen" | "/mic" => ChatCommand::Listen,
        "/attach" | "/file" => {
            if arg.is_empty() {
                ChatCommand::Unknown("/attach requires a file path".to_string())
            } else {
                let (path, text) = arg.split_once(' ').unwrap_or((arg, ""));
                ChatCommand::Attach {
                    path: PathBuf::from(path),
                    text: text.trim().to_string(),
                }
            }
        }
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

pub fn print_help(out: &mut impl Write) {
    let rows = [
        ("/help", "Show this help message"),
        ("/attach <file> [message]", "Send a file (image, PDF or text)"),
        ("/voice", "Turn spoken replies on or off"),
        ("/listen", "Dictate a message"),
        ("/history", "Show the conversation"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
    ];
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Available commands:").bold());
    let _ = writeln!(out);
    for (cmd, desc) in rows {
        let _ = writeln!(out, "  {:<26} {desc}", style(cmd).cyan());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style("Ctrl+D to exit").dim());
    let _ = writeln!(out);
}
