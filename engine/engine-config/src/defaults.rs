//! Default configuration values loaded from config.defaults.toml.
//!
//! This module loads defaults from the shared TOML file at compile time,
//! so the binary and the checked-in file can never disagree.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    diagnostics: DiagnosticsDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    exploration: f64,
    first_move_ms: u64,
    turn_ms: u64,
    max_iterations: u32,
    rollout_shortcut: bool,
    forced_center_opening: bool,
    count_won_boards_on_stalemate: bool,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticsDefaults {
    render_board: bool,
    dump_tree: bool,
    dump_path: String,
    dump_depth: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn exploration() -> f64 {
    DEFAULTS.search.exploration
}
pub fn first_move_ms() -> u64 {
    DEFAULTS.search.first_move_ms
}
pub fn turn_ms() -> u64 {
    DEFAULTS.search.turn_ms
}
pub fn max_iterations() -> u32 {
    DEFAULTS.search.max_iterations
}
pub fn rollout_shortcut() -> bool {
    DEFAULTS.search.rollout_shortcut
}
pub fn forced_center_opening() -> bool {
    DEFAULTS.search.forced_center_opening
}
pub fn count_won_boards_on_stalemate() -> bool {
    DEFAULTS.search.count_won_boards_on_stalemate
}
pub fn seed() -> Option<u64> {
    DEFAULTS.search.seed
}

// Diagnostics
pub fn render_board() -> bool {
    DEFAULTS.diagnostics.render_board
}
pub fn dump_tree() -> bool {
    DEFAULTS.diagnostics.dump_tree
}
pub fn dump_path() -> &'static str {
    &DEFAULTS.diagnostics.dump_path
}
pub fn dump_depth() -> u32 {
    DEFAULTS.diagnostics.dump_depth
}
