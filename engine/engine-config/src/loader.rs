//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by UTTT_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var("UTTT_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from UTTT_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "UTTT_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// An unreadable or malformed file is logged and replaced by the defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, bool)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparseable {}", $key),
            Err(_) => {}
        }
    };
    // Optional parseable field (Option<u64>)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = Some(v),
            Ok(Err(_)) => warn!("Ignoring unparseable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: UTTT_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "UTTT_COMMON_LOG_LEVEL");

    // Search
    env_override!(
        config,
        search.exploration,
        "UTTT_SEARCH_EXPLORATION",
        parse
    );
    env_override!(
        config,
        search.first_move_ms,
        "UTTT_SEARCH_FIRST_MOVE_MS",
        parse
    );
    env_override!(config, search.turn_ms, "UTTT_SEARCH_TURN_MS", parse);
    env_override!(
        config,
        search.max_iterations,
        "UTTT_SEARCH_MAX_ITERATIONS",
        parse
    );
    env_override!(
        config,
        search.rollout_shortcut,
        "UTTT_SEARCH_ROLLOUT_SHORTCUT",
        parse
    );
    env_override!(
        config,
        search.forced_center_opening,
        "UTTT_SEARCH_FORCED_CENTER_OPENING",
        parse
    );
    env_override!(
        config,
        search.count_won_boards_on_stalemate,
        "UTTT_SEARCH_COUNT_WON_BOARDS_ON_STALEMATE",
        parse
    );
    env_override!(config, search.seed, "UTTT_SEARCH_SEED", optional_parse);

    // Diagnostics
    env_override!(
        config,
        diagnostics.render_board,
        "UTTT_DIAGNOSTICS_RENDER_BOARD",
        parse
    );
    env_override!(
        config,
        diagnostics.dump_tree,
        "UTTT_DIAGNOSTICS_DUMP_TREE",
        parse
    );
    env_override!(config, diagnostics.dump_path, "UTTT_DIAGNOSTICS_DUMP_PATH");
    env_override!(
        config,
        diagnostics.dump_depth,
        "UTTT_DIAGNOSTICS_DUMP_DEPTH",
        parse
    );

    config
}
