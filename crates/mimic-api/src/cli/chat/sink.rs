//! `MessageSink` that writes bot output to the terminal.

use std::io::Write;

use console::style;
use mimic_core::outbound::MessageSink;
use mimic_types::error::DeliveryError;

/// Prints everything the bot says, tagged with its channel.
pub struct ConsoleSink {
    bot_name: String,
}

impl ConsoleSink {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    /// Render one bot line without styling.
    pub fn format_line(&self, channel: &str, text: &str) -> String {
        format!("[#{channel}] {}: {text}", self.bot_name)
    }
}

impl MessageSink for ConsoleSink {
    async fn send(&self, channel: &str, text: &str) -> Result<(), DeliveryError> {
        let line = style(self.format_line(channel, text)).magenta();
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\r{line}").map_err(|e| DeliveryError::SendFailed(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| DeliveryError::SendFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        let sink = ConsoleSink::new("mimic");
        assert_eq!(
            sink.format_line("general", "hello there"),
            "[#general] mimic: hello there"
        );
    }
}
