//! Welcome banner for the console host.

use console::style;

/// Print the welcome banner when the console starts.
pub fn print_welcome_banner(bot_name: &str, mode: &str, channel: &str, speaker: &str) {
    println!();
    println!("  {} {}", style("*").magenta(), style(bot_name).cyan().bold());
    println!("  {}", style("Listening, learning, occasionally talking back").dim());
    println!();
    println!("  {}     {}", style("Mode:").bold(), style(mode).dim());
    println!("  {}  {}", style("Channel:").bold(), style(format!("#{channel}")).dim());
    println!("  {} {}", style("Speaking:").bold(), style(speaker).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
