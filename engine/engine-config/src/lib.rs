//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the bot binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`UTTT_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! UTTT_<SECTION>_<KEY>=value
//!
//! Examples:
//!     UTTT_COMMON_LOG_LEVEL=debug
//!     UTTT_SEARCH_TURN_MS=80
//!     UTTT_SEARCH_ROLLOUT_SHORTCUT=true
//!     UTTT_SEARCH_SEED=42
//!     UTTT_DIAGNOSTICS_DUMP_TREE=true
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
