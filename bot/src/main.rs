//! uttt-bot - Ultimate Tic-Tac-Toe player for a line-protocol referee
//!
//! A process that lives for one game:
//! 1. Reads the opponent's move and the valid actions from stdin
//! 2. Runs a time-bounded MCTS search, reusing the tree between turns
//! 3. Writes its move to stdout
//!
//! stdout carries only the protocol; all logging goes to stderr.

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::{error, info};

mod config;
mod protocol;
mod session;

use crate::config::Config;
use crate::session::GameSession;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    info!(
        exploration = config.exploration,
        first_move_ms = config.first_move_ms,
        turn_ms = config.turn_ms,
        max_iterations = config.max_iterations,
        rollout_shortcut = config.rollout_shortcut,
        forced_center_opening = config.forced_center_opening,
        "Starting uttt-bot"
    );

    let mut session = GameSession::new(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();

    match session::run(&mut session, stdin.lock(), stdout.lock()) {
        Ok(()) => {
            info!("Game completed");
            Ok(())
        }
        Err(e) => {
            error!("Bot failed: {:#}", e);
            Err(e)
        }
    }
}
