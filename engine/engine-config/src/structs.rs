//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_exploration() -> f64 {
    defaults::exploration()
}
fn d_first_move_ms() -> u64 {
    defaults::first_move_ms()
}
fn d_turn_ms() -> u64 {
    defaults::turn_ms()
}
fn d_max_iterations() -> u32 {
    defaults::max_iterations()
}
fn d_rollout_shortcut() -> bool {
    defaults::rollout_shortcut()
}
fn d_forced_center_opening() -> bool {
    defaults::forced_center_opening()
}
fn d_count_won_boards() -> bool {
    defaults::count_won_boards_on_stalemate()
}
fn d_seed() -> Option<u64> {
    defaults::seed()
}
fn d_render_board() -> bool {
    defaults::render_board()
}
fn d_dump_tree() -> bool {
    defaults::dump_tree()
}
fn d_dump_path() -> String {
    defaults::dump_path().into()
}
fn d_dump_depth() -> u32 {
    defaults::dump_depth()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Search budget, exploration and game rule settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(default = "d_exploration")]
    pub exploration: f64,
    /// Time budget for our first move
    #[serde(default = "d_first_move_ms")]
    pub first_move_ms: u64,
    /// Time budget for every later move
    #[serde(default = "d_turn_ms")]
    pub turn_ms: u64,
    /// Fixed simulation count per move (0 = search by time)
    #[serde(default = "d_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "d_rollout_shortcut")]
    pub rollout_shortcut: bool,
    #[serde(default = "d_forced_center_opening")]
    pub forced_center_opening: bool,
    #[serde(default = "d_count_won_boards")]
    pub count_won_boards_on_stalemate: bool,
    /// Fixed RNG seed (None = seed from the OS)
    #[serde(default = "d_seed")]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: defaults::exploration(),
            first_move_ms: defaults::first_move_ms(),
            turn_ms: defaults::turn_ms(),
            max_iterations: defaults::max_iterations(),
            rollout_shortcut: defaults::rollout_shortcut(),
            forced_center_opening: defaults::forced_center_opening(),
            count_won_boards_on_stalemate: defaults::count_won_boards_on_stalemate(),
            seed: defaults::seed(),
        }
    }
}

/// Board rendering and tree dump settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiagnosticsConfig {
    #[serde(default = "d_render_board")]
    pub render_board: bool,
    #[serde(default = "d_dump_tree")]
    pub dump_tree: bool,
    #[serde(default = "d_dump_path")]
    pub dump_path: String,
    /// Number of tree levels labelled in the dump
    #[serde(default = "d_dump_depth")]
    pub dump_depth: u32,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            render_board: defaults::render_board(),
            dump_tree: defaults::dump_tree(),
            dump_path: defaults::dump_path().into(),
            dump_depth: defaults::dump_depth(),
        }
    }
}
