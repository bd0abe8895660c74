//! Input parsing for the console host.
//!
//! Lines starting with `/` are host meta-commands. Lines addressed to the bot
//! are parsed into operator commands. Everything else is a chat message.

use console::style;
use mimic_core::dispatch::AddressBook;
use mimic_core::session::Command;

/// Host meta-commands, handled by the console itself.
#[derive(Debug, PartialEq)]
pub enum HostCommand {
    /// Show available commands.
    Help,
    /// Exit the console.
    Exit,
    /// Speak as another user from now on.
    As(String),
    /// Move to another channel.
    Join(String),
    /// Unknown or malformed command.
    Unknown(String),
}

/// What a line of console input means.
#[derive(Debug, PartialEq)]
pub enum ConsoleInput {
    Host(HostCommand),
    Operator(Command),
    Message(String),
    Blank,
}

/// Parse user input as a host meta-command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse_host(input: &str) -> Option<HostCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let with_arg = |usage: &str, make: fn(String) -> HostCommand| {
        if arg.is_empty() {
            HostCommand::Unknown(usage.to_string())
        } else {
            make(arg.to_string())
        }
    };

    Some(match cmd.as_str() {
        "/help" | "/h" | "/?" => HostCommand::Help,
        "/exit" | "/quit" | "/q" => HostCommand::Exit,
        "/as" => with_arg("/as requires a user name", HostCommand::As),
        "/join" | "/j" => with_arg("/join requires a channel", HostCommand::Join),
        other => HostCommand::Unknown(other.to_string()),
    })
}

const IMPERSONATE: &str = "impersonate ";

/// Parse the text following the bot's name into an operator command.
pub fn parse_operator(rest: &str) -> Option<Command> {
    let lowered = rest.trim().to_lowercase();

    match lowered.as_str() {
        "stop impersonating" => return Some(Command::Stop),
        "give impersonation status" => return Some(Command::Status),
        "stop impersonation in here" => return Some(Command::Restrict),
        "start impersonation in here" => return Some(Command::Unrestrict),
        _ => {}
    }

    if !lowered.starts_with(IMPERSONATE) {
        return None;
    }
    let name = rest.trim().get(IMPERSONATE.len()..)?.trim();
    if name.is_empty() {
        return None;
    }
    Some(Command::Impersonate {
        name: name.to_string(),
    })
}

/// Classify one line of console input.
pub fn classify(input: &str, address: &AddressBook) -> ConsoleInput {
    if input.trim().is_empty() {
        return ConsoleInput::Blank;
    }
    if let Some(cmd) = parse_host(input) {
        return ConsoleInput::Host(cmd);
    }
    if let Some(command) = address.strip_address(input).and_then(parse_operator) {
        return ConsoleInput::Operator(command);
    }
    ConsoleInput::Message(input.to_string())
}

/// Print the help text listing all available commands.
pub fn print_help(bot_name: &str) {
    println!();
    println!("  {}", style("Console commands:").bold());
    println!();
    println!("  {}          {}", style("/help").cyan(), "Show this help message");
    println!("  {}   {}", style("/as <user>").cyan(), "Speak as another user");
    println!("  {} {}", style("/join <chan>").cyan(), "Move to another channel");
    println!("  {}          {}", style("/quit").cyan(), "Leave the console");
    println!();
    println!("  {}", style("Talking to the bot:").bold());
    println!();
    for phrase in [
        "impersonate <user>",
        "stop impersonating",
        "give impersonation status",
        "stop impersonation in here",
        "start impersonation in here",
    ] {
        println!("  {} {}", style(bot_name).cyan(), phrase);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
