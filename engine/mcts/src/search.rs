//! MCTS search implementation.
//!
//! Implements the core MCTS cycle:
//! 1. Selection: descend the tree by UCB1 to a node without children
//! 2. Expansion: a leaf that was already visited gets its children
//! 3. Rollout: play the reached state out with the rollout policy
//! 4. Backpropagation: add the outcome to every node up to the root

use std::time::{Duration, Instant};

use games_uttt::{format_cell, GameError, GameState};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{Budget, MctsConfig, RolloutPolicy};
use crate::rollout::Rollout;
use crate::tree::MctsTree;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search produced no visited move at the root")]
    NoSearchResult,

    #[error(
        "Opponent move {} is not legal at the root (last move {:?}, legal moves {:?}, children {:?})",
        describe_cell(.cell), .last_move, .legal_moves, .children
    )]
    OpponentMoveMismatch {
        cell: u8,
        last_move: Option<u8>,
        legal_moves: Vec<u8>,
        children: Vec<u8>,
    },

    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

fn describe_cell(cell: &u8) -> String {
    format_cell(*cell)
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best cell to play
    pub action: u8,

    /// Mean outcome of the chosen child
    pub value: f32,

    /// Visits of the chosen child
    pub visits: u32,

    /// Number of simulations performed by this search
    pub simulations: u32,

    /// Wall-clock time since the search start instant
    pub elapsed: Duration,
}

/// MCTS search state.
///
/// Owns the tree across turns, so statistics gathered for one move are
/// reused after `advance` moves the root down.
#[derive(Debug)]
pub struct MctsSearch<R: Rollout = RolloutPolicy> {
    tree: MctsTree,
    rollout: R,
    config: MctsConfig,
}

impl MctsSearch<RolloutPolicy> {
    /// Create a search rooted at `state`, using the configured rollout policy.
    pub fn new(config: MctsConfig, state: GameState) -> Self {
        let rollout = config.rollout;
        Self::with_rollout(config, state, rollout)
    }
}

impl<R: Rollout> MctsSearch<R> {
    /// Create a search rooted at `state` with a custom rollout.
    pub fn with_rollout(config: MctsConfig, state: GameState, rollout: R) -> Self {
        Self {
            tree: MctsTree::new(state),
            rollout,
            config,
        }
    }

    /// Run the search within `budget`, starting the clock now.
    pub fn run(
        &mut self,
        budget: Budget,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult, SearchError> {
        self.run_from(Instant::now(), budget, rng)
    }

    /// Run the search for one turn using the configured budget for that
    /// phase of the game, timed from `start`.
    pub fn run_turn(
        &mut self,
        first_move: bool,
        start: Instant,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult, SearchError> {
        let budget = self.config.budget_for(first_move);
        self.run_from(start, budget, rng)
    }

    /// Run the search within `budget`, measuring time from `start`.
    ///
    /// The deadline is checked once per simulation, before it begins.
    pub fn run_from(
        &mut self,
        start: Instant,
        budget: Budget,
        rng: &mut ChaCha20Rng,
    ) -> Result<SearchResult, SearchError> {
        let mut simulations = 0u32;
        loop {
            let done = match budget {
                Budget::Iterations(n) => simulations >= n,
                Budget::Time(limit) => start.elapsed() >= limit,
            };
            if done {
                break;
            }
            self.simulate(rng)?;
            simulations += 1;
        }

        let elapsed = start.elapsed();
        let stats = self.tree.stats();
        debug!(
            simulations,
            elapsed_ms = elapsed.as_millis() as u64,
            nodes = stats.total_nodes,
            root_visits = stats.root_visits,
            max_depth = stats.max_depth,
            "MCTS search complete"
        );

        let (action, child_id) = self.tree.best_move().ok_or(SearchError::NoSearchResult)?;
        let child = self.tree.get(child_id);

        Ok(SearchResult {
            action,
            value: child.mean_value(),
            visits: child.visit_count,
            simulations,
            elapsed,
        })
    }

    /// Run a single simulation (select -> expand -> rollout -> backpropagate).
    pub fn simulate(&mut self, rng: &mut ChaCha20Rng) -> Result<(), SearchError> {
        // Selection: descend to a node without children
        let mut leaf_id = self.tree.select_leaf(self.config.exploration);

        // Expansion: only leaves that already have a rollout behind them
        if self.tree.get(leaf_id).visit_count > 0 {
            leaf_id = self.tree.expand(leaf_id)?;
        }

        // Rollout
        let value = self.rollout.rollout(&self.tree.get(leaf_id).state, rng)?;

        // Backpropagation
        self.tree.backpropagate(leaf_id, value);

        trace!(leaf = leaf_id.0, value, "MCTS simulation complete");

        Ok(())
    }

    /// Move the root to the child reached by `cell` (either side's move).
    pub fn advance(&mut self, cell: u8) -> Result<(), SearchError> {
        self.tree.advance(cell)
    }

    /// Best root move found so far, if any child was visited.
    pub fn best_move(&self) -> Option<u8> {
        self.tree.best_move().map(|(action, _)| action)
    }

    /// State at the root of the tree.
    pub fn root_state(&self) -> &GameState {
        &self.tree.get(self.tree.root()).state
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    /// Get the search configuration.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }
}

/// Convenience function to run a single MCTS search from a fresh tree.
pub fn run_mcts(
    config: MctsConfig,
    state: GameState,
    budget: Budget,
    rng: &mut ChaCha20Rng,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(config, state);
    search.run(budget, rng)
}
