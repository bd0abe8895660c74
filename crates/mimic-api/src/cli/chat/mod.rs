//! Interactive console host for Mimic.
//!
//! Stands in for a chat platform: every line typed is a message from the
//! current speaker in the current channel, and the bot listens, learns and
//! (when impersonating) answers. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod loop_runner;
pub mod sink;
