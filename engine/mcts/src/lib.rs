//! Monte Carlo Tree Search (MCTS) for Ultimate Tic-Tac-Toe.
//!
//! This crate searches [`games_uttt::GameState`] positions with UCB1
//! selection and random rollouts. Values are always scored from `Me`'s point
//! of view, so the same rollout outcome is added at every level of the tree.
//!
//! # Overview
//!
//! Each simulation consists of four phases:
//!
//! 1. **Selection**: descend from the root, taking the child with the best
//!    UCB1 score `mean + C * sqrt(ln(N_parent) / N)` until a node has no
//!    children
//! 2. **Expansion**: a leaf that has already been visited gets one child per
//!    legal move (or only its first game-ending move, if it has one)
//! 3. **Rollout**: play random moves to the end of the game
//! 4. **Backpropagation**: add the outcome to every node up to the root
//!
//! # Usage
//!
//! ```rust
//! use games_uttt::{GameState, Player};
//! use mcts::{run_mcts, Budget, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = run_mcts(
//!     MctsConfig::default(),
//!     GameState::new(Player::Me),
//!     Budget::Iterations(500),
//!     &mut rng,
//! )
//! .unwrap();
//!
//! // The opening is forced to the center cell
//! assert_eq!(result.action, 40);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `exploration`: UCB1 exploration constant (default: 2.0)
//! - `first_move_budget`: budget for our first move (default: 990 ms)
//! - `turn_budget`: budget for every later move (default: 90 ms)
//! - `rollout`: [`RolloutPolicy::Random`] or [`RolloutPolicy::WinShortcut`]
//!
//! # Tree reuse
//!
//! [`MctsSearch`] keeps its tree between turns. After a move is played
//! (ours or the opponent's), [`MctsSearch::advance`] re-roots the tree at the
//! matching child so its statistics carry over.

pub mod config;
pub mod export;
pub mod node;
pub mod rollout;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{Budget, MctsConfig, RolloutPolicy};
pub use export::{dump_tree, write_dot};
pub use node::{MctsNode, NodeId};
pub use rollout::{RandomRollout, Rollout, WinShortcutRollout};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use tree::{ChildSummary, MctsTree, TreeStats};
