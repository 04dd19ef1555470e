//! MCTS configuration parameters.

use std::time::Duration;

/// How long a single search may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Stop after this many simulations.
    Iterations(u32),

    /// Stop once this much wall-clock time has passed since the search start.
    /// Checked between simulations, so a search overruns by at most one
    /// rollout.
    Time(Duration),
}

impl Budget {
    /// Convenience constructor for a millisecond time budget.
    pub fn millis(ms: u64) -> Self {
        Budget::Time(Duration::from_millis(ms))
    }
}

/// Playout policy used to evaluate a newly reached node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloutPolicy {
    /// Uniformly random legal moves until the game ends.
    #[default]
    Random,

    /// Before each random move, take any move that ends the game at once.
    WinShortcut,
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant C in UCB1 = mean + C * sqrt(ln(N_parent) / N).
    pub exploration: f32,

    /// Budget for the first move of a game, where there is more time.
    pub first_move_budget: Budget,

    /// Budget for every later move.
    pub turn_budget: Budget,

    /// Playout policy.
    pub rollout: RolloutPolicy,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 2.0,
            first_move_budget: Budget::millis(990),
            turn_budget: Budget::millis(90),
            rollout: RolloutPolicy::Random,
        }
    }
}

impl MctsConfig {
    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            exploration: 2.0,
            first_move_budget: Budget::Iterations(200),
            turn_budget: Budget::Iterations(200),
            rollout: RolloutPolicy::Random,
        }
    }

    /// Budget for a move, depending on whether it is our first one.
    pub fn budget_for(&self, first_move: bool) -> Budget {
        if first_move {
            self.first_move_budget
        } else {
            self.turn_budget
        }
    }

    /// Builder pattern: set the same iteration budget for every move.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.first_move_budget = Budget::Iterations(n);
        self.turn_budget = Budget::Iterations(n);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, c: f32) -> Self {
        self.exploration = c;
        self
    }

    /// Builder pattern: set the first-move and later-move budgets.
    pub fn with_budgets(mut self, first_move: Budget, turn: Budget) -> Self {
        self.first_move_budget = first_move;
        self.turn_budget = turn;
        self
    }

    /// Builder pattern: set the rollout policy.
    pub fn with_rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }
}
