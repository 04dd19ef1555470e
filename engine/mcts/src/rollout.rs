//! Rollout policies for leaf evaluation.
//!
//! A rollout plays a position out to the end and reports the final
//! outcome from `Me`'s point of view: 1.0 win, 0.0 loss, 0.5 draw.

use games_uttt::{GameError, GameState};
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::config::RolloutPolicy;

/// Trait for leaf evaluators.
///
/// Implementations:
/// - RandomRollout: uniform random playout
/// - WinShortcutRollout: random playout that takes immediate wins
pub trait Rollout: Send + Sync {
    /// Play `state` out to a terminal position and return its outcome.
    /// A state that is already terminal returns its own outcome.
    fn rollout(&self, state: &GameState, rng: &mut ChaCha20Rng) -> Result<f32, GameError>;
}

/// Pick a uniformly random legal move of a non-terminal state.
fn random_move(state: &GameState, rng: &mut ChaCha20Rng) -> Result<u8, GameError> {
    let count = state.legal_move_count() as usize;
    let pick = rng.gen_range(0..count);
    state
        .nth_legal_move(pick)
        .ok_or_else(|| GameError::InvalidPosition(format!("no legal move at index {}", pick)))
}

/// Uniformly random playout.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRollout;

impl RandomRollout {
    pub fn new() -> Self {
        Self
    }
}

impl Rollout for RandomRollout {
    fn rollout(&self, state: &GameState, rng: &mut ChaCha20Rng) -> Result<f32, GameError> {
        let mut state = *state;
        while !state.is_terminal() {
            let cell = random_move(&state, rng)?;
            state.play(cell)?;
        }
        Ok(state.outcome())
    }
}

/// Random playout that first scans for a move ending the game.
///
/// At each step every legal move is tried; if one makes the position
/// terminal, its outcome is returned at once. Otherwise a random move is
/// played. Slower per step, but sharper near the end of a game.
#[derive(Debug, Clone, Copy, Default)]
pub struct WinShortcutRollout;

impl WinShortcutRollout {
    pub fn new() -> Self {
        Self
    }
}

impl Rollout for WinShortcutRollout {
    fn rollout(&self, state: &GameState, rng: &mut ChaCha20Rng) -> Result<f32, GameError> {
        let mut state = *state;
        while !state.is_terminal() {
            for cell in state.legal_moves_iter() {
                let next = state.after(cell)?;
                if next.is_terminal() {
                    return Ok(next.outcome());
                }
            }
            let cell = random_move(&state, rng)?;
            state.play(cell)?;
        }
        Ok(state.outcome())
    }
}

impl Rollout for RolloutPolicy {
    fn rollout(&self, state: &GameState, rng: &mut ChaCha20Rng) -> Result<f32, GameError> {
        match self {
            RolloutPolicy::Random => RandomRollout.rollout(state, rng),
            RolloutPolicy::WinShortcut => WinShortcutRollout.rollout(state, rng),
        }
    }
}
