//! Main console loop.
//!
//! Reads stdin line by line. Host commands change who is speaking and where;
//! operator commands go to the dispatcher's command handler; everything else
//! is an inbound chat message.

use std::io::Write;
use std::sync::Arc;

use console::style;
use mimic_core::dispatch::{AddressBook, DispatchOutcome};
use mimic_types::chat::{InboundMessage, UserRecord};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ConsoleInput, HostCommand};
use super::sink::ConsoleSink;

/// Console speakers have no platform id; the lower-cased name stands in.
pub fn console_user(name: &str) -> UserRecord {
    UserRecord::new(name.trim().to_lowercase(), name.trim())
}

fn print_prompt(channel: &str, speaker: &str) {
    print!("{} ", style(format!("[#{channel}] {speaker}>")).dim());
    let _ = std::io::stdout().flush();
}

/// Run the interactive console until `/quit` or end of input.
pub async fn run_chat_loop(state: &AppState, channel: String, user: String) -> anyhow::Result<()> {
    let config = &state.config;
    let sink = Arc::new(ConsoleSink::new(&config.bot_name));
    let mut dispatcher = state.dispatcher(Arc::clone(&sink));
    let address = AddressBook::new(&config.bot_name, &config.bot_aliases);

    let mut channel = channel;
    let mut speaker = console_user(&user);

    print_welcome_banner(&config.bot_name, &config.mode.to_string(), &channel, &speaker.name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&channel, &speaker.name);
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match commands::classify(&line, &address) {
            ConsoleInput::Blank => {}
            ConsoleInput::Host(HostCommand::Help) => commands::print_help(&config.bot_name),
            ConsoleInput::Host(HostCommand::Exit) => break,
            ConsoleInput::Host(HostCommand::As(name)) => {
                speaker = console_user(&name);
            }
            ConsoleInput::Host(HostCommand::Join(name)) => {
                channel = name.trim_start_matches('#').to_string();
            }
            ConsoleInput::Host(HostCommand::Unknown(what)) => {
                println!("  {} {}", style("?").yellow().bold(), what);
            }
            ConsoleInput::Operator(command) => {
                // The platform still sees the line as a message from the speaker.
                let msg = InboundMessage::new(&channel, speaker.clone(), line.as_str());
                dispatcher.handle_message(&msg).await;

                if let Err(e) = dispatcher.handle_command(command, &channel).await {
                    println!("  {} {e}", style("error:").red().bold());
                }
            }
            ConsoleInput::Message(text) => {
                let msg = InboundMessage::new(&channel, speaker.clone(), text);
                let outcome = dispatcher.handle_message(&msg).await;
                if let DispatchOutcome::Skipped(reason) = outcome {
                    debug!(?reason, "message skipped");
                }
            }
        }
    }

    let dropped = dispatcher.scheduler().cancel_all();
    if dropped > 0 {
        debug!(dropped, "pending replies dropped on exit");
    }
    Ok(())
}
