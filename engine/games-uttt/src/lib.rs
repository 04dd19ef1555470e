//! Ultimate Tic-Tac-Toe board for the MCTS engine.
//!
//! The 9x9 board is nine 3x3 sub-boards. The cell a player picks inside its
//! sub-board names the sub-board the opponent must answer in; if that
//! sub-board is already decided or full, the opponent may play anywhere still
//! open. Three won sub-boards in a line win the game.
//!
//! Both players' cells are kept as 81-bit sets (`u128`) packed so that each
//! sub-board is a contiguous 9-bit slice. Move generation and line detection
//! are then a handful of mask operations, which keeps random rollouts cheap.
//!
//! # Usage
//!
//! ```rust
//! use games_uttt::{codec, GameState, Player};
//!
//! let mut state = GameState::new(Player::Me);
//! // The opening is forced to the center of the center sub-board.
//! assert_eq!(state.legal_moves(), vec![codec::CENTER_CELL]);
//!
//! state.play(codec::CENTER_CELL).unwrap();
//! assert!(state.legal_moves().iter().all(|&c| codec::sub_board_of(c) == 4));
//! ```

pub mod codec;
pub mod lines;
pub mod render;
mod state;

pub use codec::{cell_index, format_cell, row_col, sub_board_of, try_cell_index};
pub use render::{render_board, render_grid};
pub use state::{
    sub_board_mask, sub_board_pattern, Board, GameError, GameState, Player, Rules,
    SubBoardStatus, BOARD_MASK,
};

#[cfg(test)]
mod tests;
