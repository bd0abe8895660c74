//! Mimic CLI entry point.
//!
//! Binary name: `mimic`
//!
//! Parses CLI arguments, installs tracing, opens the data store and
//! dispatches to the command handler.

mod cli;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    mimic_observe::tracing_setup::init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize tracing")?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "mimic", &mut std::io::stdout());
        return Ok(());
    }

    let state = match &cli.data_dir {
        Some(dir) => AppState::init_in(dir.clone()).await?,
        None => AppState::init().await?,
    };

    let result = match cli.command {
        Commands::Chat { channel, user } => {
            cli::chat::loop_runner::run_chat_loop(&state, channel, user).await
        }
        Commands::Train {
            user_id,
            file,
            name,
        } => cli::train::train_from_file(&state, &user_id, &file, name.as_deref(), cli.json).await,
        Commands::Generate {
            user_id,
            seed,
            count,
            rng_seed,
        } => cli::generate::generate(&state, &user_id, &seed, count, rng_seed, cli.json).await,
        Commands::Models => cli::models::list_models(&state, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    mimic_observe::tracing_setup::shutdown_tracing();
    result
}
