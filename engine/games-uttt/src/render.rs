//! ASCII rendering for diagnostics.
//!
//! `o` marks my cells and `x` the opponent's. A sub-board won by me is drawn
//! as a ring of `o` and one won by the opponent as an `x` cross, so decided
//! sub-boards stand out from the cells still in play.

use std::fmt;

use crate::codec::{cell_index, format_cell, local_of, sub_board_of};
use crate::state::{GameState, SubBoardStatus};

const ROW_SEPARATOR: &str = "------|-------|------";

fn glyph(state: &GameState, cell: u8) -> char {
    let local = local_of(cell);
    match state.sub_board_status(sub_board_of(cell)) {
        SubBoardStatus::WonByMe => {
            if local == 4 {
                ' '
            } else {
                'o'
            }
        }
        SubBoardStatus::WonByOpponent => {
            if local % 2 == 0 {
                'x'
            } else {
                ' '
            }
        }
        SubBoardStatus::Open | SubBoardStatus::Drawn => {
            let bit = 1u128 << cell;
            if state.my_cells() & bit != 0 {
                'o'
            } else if state.opp_cells() & bit != 0 {
                'x'
            } else {
                '.'
            }
        }
    }
}

/// The 9x9 grid with sub-board separators, without a header.
pub fn render_grid(state: &GameState) -> String {
    let mut lines = Vec::with_capacity(11);
    for row in 0..9u8 {
        if row == 3 || row == 6 {
            lines.push(ROW_SEPARATOR.to_string());
        }
        let mut line = String::with_capacity(21);
        for col in 0..9u8 {
            if col > 0 {
                line.push_str(if col % 3 == 0 { " | " } else { " " });
            }
            line.push(glyph(state, cell_index(row, col)));
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Header line plus grid.
pub fn render_board(state: &GameState) -> String {
    format!("{}\n{}", header(state), render_grid(state))
}

fn header(state: &GameState) -> String {
    let last_move = state
        .last_move()
        .map(format_cell)
        .unwrap_or_else(|| "none".to_string());
    format!(
        "my_turn = {}  last_move = {}  ply = {}",
        state.is_my_turn(),
        last_move,
        state.ply()
    )
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board(self))
    }
}
