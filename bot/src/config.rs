//! Configuration for the bot
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use engine_config::{load_config, CentralConfig};
use games_uttt::Rules;
use mcts::{Budget, MctsConfig, RolloutPolicy};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_exploration() -> f32 {
    CENTRAL_CONFIG.search.exploration as f32
}

fn default_first_move_ms() -> u64 {
    CENTRAL_CONFIG.search.first_move_ms
}

fn default_turn_ms() -> u64 {
    CENTRAL_CONFIG.search.turn_ms
}

fn default_max_iterations() -> u32 {
    CENTRAL_CONFIG.search.max_iterations
}

fn default_rollout_shortcut() -> bool {
    CENTRAL_CONFIG.search.rollout_shortcut
}

fn default_forced_center_opening() -> bool {
    CENTRAL_CONFIG.search.forced_center_opening
}

fn default_count_won_boards() -> bool {
    CENTRAL_CONFIG.search.count_won_boards_on_stalemate
}

fn default_render_board() -> bool {
    CENTRAL_CONFIG.diagnostics.render_board
}

fn default_dump_tree() -> bool {
    CENTRAL_CONFIG.diagnostics.dump_tree
}

fn default_dump_path() -> String {
    CENTRAL_CONFIG.diagnostics.dump_path.clone()
}

fn default_dump_depth() -> u32 {
    CENTRAL_CONFIG.diagnostics.dump_depth
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "uttt-bot")]
#[command(about = "Ultimate Tic-Tac-Toe bot - MCTS player speaking the line protocol")]
#[command(
    long_about = "Reads the opponent's move and the list of valid actions from stdin each
turn and answers with one `row col` line on stdout. Logs go to stderr.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// UCB1 exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f32,

    /// Time budget for our first move, in milliseconds
    #[arg(long, default_value_t = default_first_move_ms())]
    pub first_move_ms: u64,

    /// Time budget for every later move, in milliseconds
    #[arg(long, default_value_t = default_turn_ms())]
    pub turn_ms: u64,

    /// Fixed number of simulations per move instead of a time budget (0 to disable)
    #[arg(long, default_value_t = default_max_iterations())]
    pub max_iterations: u32,

    /// Take game-ending moves immediately during rollouts
    #[arg(long, default_value_t = default_rollout_shortcut(), action = ArgAction::Set)]
    pub rollout_shortcut: bool,

    /// Open the game on the center cell
    #[arg(long, default_value_t = default_forced_center_opening(), action = ArgAction::Set)]
    pub forced_center_opening: bool,

    /// Score a game without a meta-line by counting won sub-boards
    #[arg(long, default_value_t = default_count_won_boards(), action = ArgAction::Set)]
    pub count_won_boards_on_stalemate: bool,

    /// Fixed RNG seed (defaults to the configured seed, else OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log the board at debug level after every move
    #[arg(long, default_value_t = default_render_board(), action = ArgAction::Set)]
    pub render_board: bool,

    /// Write the search tree as Graphviz DOT after every move
    #[arg(long, default_value_t = default_dump_tree(), action = ArgAction::Set)]
    pub dump_tree: bool,

    /// Path of the DOT file
    #[arg(long, default_value_t = default_dump_path())]
    pub dump_path: String,

    /// Number of tree levels labelled in the DOT file
    #[arg(long, default_value_t = default_dump_depth())]
    pub dump_depth: u32,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(anyhow!(
                "exploration must be a non-negative number, got {}",
                self.exploration
            ));
        }

        if self.max_iterations == 0 {
            if self.first_move_ms == 0 {
                return Err(anyhow!("first_move_ms must be greater than 0"));
            }
            if self.turn_ms == 0 {
                return Err(anyhow!("turn_ms must be greater than 0"));
            }
        }

        if self.dump_tree {
            if self.dump_path.is_empty() {
                return Err(anyhow!("dump_path cannot be empty when dump_tree is set"));
            }
            if self.dump_depth == 0 {
                return Err(anyhow!("dump_depth must be greater than 0"));
            }
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Search settings for the `mcts` crate.
    pub fn mcts_config(&self) -> MctsConfig {
        let (first_move, turn) = if self.max_iterations > 0 {
            (
                Budget::Iterations(self.max_iterations),
                Budget::Iterations(self.max_iterations),
            )
        } else {
            (Budget::millis(self.first_move_ms), Budget::millis(self.turn_ms))
        };
        let rollout = if self.rollout_shortcut {
            RolloutPolicy::WinShortcut
        } else {
            RolloutPolicy::Random
        };

        MctsConfig::default()
            .with_exploration(self.exploration)
            .with_budgets(first_move, turn)
            .with_rollout(rollout)
    }

    /// Game rules for every position the bot builds.
    pub fn rules(&self) -> Rules {
        Rules::default()
            .with_forced_center_opening(self.forced_center_opening)
            .with_count_won_boards_on_stalemate(self.count_won_boards_on_stalemate)
    }

    /// Seed from the command line, else from config.toml.
    pub fn resolved_seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.search.seed)
    }
}
