//! CLI command definitions for the `mimic` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod generate;
pub mod models;
pub mod train;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Learn how people in a chat talk, then talk like them.
#[derive(Parser)]
#[command(name = "mimic", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Data directory (defaults to MIMIC_DATA_DIR or ~/.mimic).
    #[arg(long, global = true, env = "MIMIC_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,mimic=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive console chat room with the bot listening in.
    Chat {
        /// Channel to start in.
        #[arg(long, default_value = "general")]
        channel: String,

        /// Speaker to start as.
        #[arg(long, default_value = "me")]
        user: String,
    },

    /// Train a user's model from a text file (one sample per line).
    Train {
        /// User id the samples belong to.
        user_id: String,

        /// Path to the corpus file.
        file: PathBuf,

        /// Display name to record for the user.
        #[arg(long)]
        name: Option<String>,
    },

    /// Generate text from a user's model.
    Generate {
        /// User id whose model to sample.
        user_id: String,

        /// Seed text steering the first word.
        #[arg(default_value = "")]
        seed: String,

        /// Number of samples to generate.
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Seed for the random generator (reproducible output).
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// List persisted text models.
    #[command(alias = "ls")]
    Models,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from(["mimic", "generate", "U1", "hello there", "-n", "3", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Generate {
                user_id,
                seed,
                count,
                rng_seed,
            } => {
                assert_eq!(user_id, "U1");
                assert_eq!(seed, "hello there");
                assert_eq!(count, 3);
                assert_eq!(rng_seed, None);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_log_filter_follows_verbosity() {
        let quiet = Cli::parse_from(["mimic", "--quiet", "models"]);
        assert_eq!(quiet.log_filter(), "error");
        let debug = Cli::parse_from(["mimic", "-v", "models"]);
        assert_eq!(debug.log_filter(), "info,mimic=debug");
    }
}
