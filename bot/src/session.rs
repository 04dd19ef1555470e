//! One game against the referee.
//!
//! The session keeps a single search tree for the whole game. Both our
//! moves and the opponent's replies re-root it, so the statistics of the
//! reached subtree carry over to the next search.

use anyhow::{Context, Result};
use games_uttt::{format_cell, render_board, GameState, Player, Rules};
use mcts::{dump_tree, MctsConfig, MctsSearch, SearchError};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::protocol::{write_move, OpponentLine, ProtocolReader};

/// Tree dump settings taken from the config.
#[derive(Debug, Clone)]
struct TreeDump {
    path: String,
    depth: u32,
}

/// Game session state.
#[derive(Debug)]
pub struct GameSession {
    mcts_config: MctsConfig,
    rules: Rules,
    search: Option<MctsSearch>,
    rng: ChaCha20Rng,
    render_board: bool,
    tree_dump: Option<TreeDump>,
    turns_played: u32,
}

impl GameSession {
    pub fn new(config: &Config) -> Self {
        let rng = match config.resolved_seed() {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let tree_dump = config.dump_tree.then(|| TreeDump {
            path: config.dump_path.clone(),
            depth: config.dump_depth,
        });

        Self {
            mcts_config: config.mcts_config(),
            rules: config.rules(),
            search: None,
            rng,
            render_board: config.render_board,
            tree_dump,
            turns_played: 0,
        }
    }

    /// Number of moves we have answered so far.
    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Current position, once the game has started.
    pub fn state(&self) -> Option<&GameState> {
        self.search.as_ref().map(|search| search.root_state())
    }

    /// Apply the opponent's move (if any), search, and return our move.
    ///
    /// `start` is when the opponent's move was received; the search budget
    /// is measured from it. If the search yields nothing, the first valid
    /// action from the referee (or the first legal move) is played instead.
    pub fn play_turn(
        &mut self,
        opponent_move: Option<u8>,
        valid_actions: &[u8],
        start: Instant,
    ) -> Result<u8> {
        let first_move = self.turns_played == 0;
        let previous = self.search.take();
        let prepared = self.prepare(previous, opponent_move)?;
        let search = self.search.insert(prepared);

        let cell = match search.run_turn(first_move, start, &mut self.rng) {
            Ok(result) => {
                info!(
                    turn = self.turns_played + 1,
                    action = %format_cell(result.action),
                    value = result.value,
                    visits = result.visits,
                    simulations = result.simulations,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "Move selected"
                );
                for child in search.tree().root_children_summary() {
                    debug!(
                        action = %format_cell(child.action),
                        visits = child.visits,
                        value = child.value_sum,
                        mean = child.mean_value,
                        "Root child"
                    );
                }
                result.action
            }
            Err(SearchError::NoSearchResult) => {
                let fallback = valid_actions
                    .first()
                    .copied()
                    .or_else(|| search.root_state().legal_moves_iter().next())
                    .context("No move available: search is empty and no action is valid")?;
                warn!(
                    action = %format_cell(fallback),
                    "Search returned no move, playing the first valid action"
                );
                fallback
            }
            Err(e) => return Err(e.into()),
        };

        if !valid_actions.is_empty() && !valid_actions.contains(&cell) {
            warn!(
                action = %format_cell(cell),
                ?valid_actions,
                "Chosen move is not in the referee's valid action list"
            );
        }

        if let Some(dump) = &self.tree_dump {
            match dump_tree(&dump.path, search.tree(), dump.depth) {
                Ok(()) => debug!(path = %dump.path, "Search tree written"),
                Err(e) => warn!("Failed to write search tree to {}: {}", dump.path, e),
            }
        }

        search.advance(cell)?;
        self.turns_played += 1;

        if self.render_board {
            debug!("\n{}", render_board(search.root_state()));
        }
        if search.root_state().is_terminal() {
            info!(
                outcome = search.root_state().outcome(),
                "Game over after our move"
            );
        }

        Ok(cell)
    }

    /// Bring the tree to the position where we are to move.
    fn prepare(
        &self,
        previous: Option<MctsSearch>,
        opponent_move: Option<u8>,
    ) -> Result<MctsSearch> {
        let search = match previous {
            Some(mut search) => {
                if let Some(cell) = opponent_move {
                    search.advance(cell).map_err(|e| {
                        error!("{}", e);
                        if self.render_board {
                            error!("\n{}", render_board(search.root_state()));
                        }
                        e
                    })?;
                }
                search
            }
            None => {
                let state = match opponent_move {
                    None => GameState::with_rules(Player::Me, self.rules),
                    Some(cell) => {
                        // The opening convention only binds our own first move
                        let rules = self.rules.with_forced_center_opening(false);
                        GameState::with_rules(Player::Opponent, rules)
                            .after(cell)
                            .context("Opponent's opening move is illegal")?
                    }
                };
                info!(
                    we_open = opponent_move.is_none(),
                    "Starting a new game"
                );
                MctsSearch::new(self.mcts_config.clone(), state)
            }
        };

        if self.render_board {
            debug!("\n{}", render_board(search.root_state()));
        }

        Ok(search)
    }
}

/// Play turns until the referee closes the input.
pub fn run<R: BufRead, W: Write>(session: &mut GameSession, input: R, mut output: W) -> Result<()> {
    let mut protocol = ProtocolReader::new(input);

    loop {
        let opponent_move = match protocol.read_opponent_move()? {
            OpponentLine::Eof => break,
            OpponentLine::NoMove => None,
            OpponentLine::Move(cell) => Some(cell),
        };
        let start = Instant::now();
        let valid_actions = protocol.read_valid_actions()?;

        let cell = session.play_turn(opponent_move, &valid_actions, start)?;
        write_move(&mut output, cell)?;
    }

    info!(turns = session.turns_played(), "Input closed");
    Ok(())
}
