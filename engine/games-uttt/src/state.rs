//! Bit-packed game state.

use thiserror::Error;

use crate::codec::{local_of, sub_board_of, CELL_COUNT, CENTER_CELL, SUB_BOARD_COUNT};
use crate::lines::{is_line_complete, FULL_PATTERN};

/// 81-bit occupancy set, one bit per packed cell index.
pub type Board = u128;

/// Bits 0-80 set.
pub const BOARD_MASK: Board = (1 << CELL_COUNT) - 1;

/// Errors raised when a state is driven outside its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move {cell} after {}", describe_last_move(.last_move))]
    IllegalMove { cell: u8, last_move: Option<u8> },

    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

fn describe_last_move(last_move: &Option<u8>) -> String {
    match last_move {
        Some(cell) => format!("move {}", cell),
        None => "no previous move".to_string(),
    }
}

/// Side to move. Outcomes are always scored from `Me`'s point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Me,
    Opponent,
}

impl Player {
    /// The other side.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Player::Me => Player::Opponent,
            Player::Opponent => Player::Me,
        }
    }
}

/// Rule variations that differ between search configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// The very first move of the game must be the center cell.
    pub forced_center_opening: bool,

    /// When nobody completes a meta-line, the side with more won sub-boards
    /// takes the game. Otherwise such a game is scored as a draw.
    pub count_won_boards_on_stalemate: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            forced_center_opening: true,
            count_won_boards_on_stalemate: true,
        }
    }
}

impl Rules {
    /// Builder pattern: set the opening convention.
    pub fn with_forced_center_opening(mut self, forced: bool) -> Self {
        self.forced_center_opening = forced;
        self
    }

    /// Builder pattern: set the stalemate scoring policy.
    pub fn with_count_won_boards_on_stalemate(mut self, count: bool) -> Self {
        self.count_won_boards_on_stalemate = count;
        self
    }
}

/// Derived status of one sub-board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubBoardStatus {
    Open,
    WonByMe,
    WonByOpponent,
    /// Full without a line for either side.
    Drawn,
}

/// Mask of the nine cells of a sub-board.
#[inline]
pub fn sub_board_mask(sub_board: u8) -> Board {
    (FULL_PATTERN as Board) << (sub_board as u32 * SUB_BOARD_COUNT as u32)
}

/// The 9-bit pattern of `board` inside `sub_board`.
#[inline]
pub fn sub_board_pattern(board: Board, sub_board: u8) -> u16 {
    ((board >> (sub_board as u32 * SUB_BOARD_COUNT as u32)) as u16) & FULL_PATTERN
}

/// Ultimate Tic-Tac-Toe position.
///
/// A small `Copy` value: search nodes snapshot it and rollouts mutate a
/// private copy. The legal move set is recomputed eagerly by every `play`, so
/// reads never need interior mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    my_cells: Board,
    opp_cells: Board,
    /// Won sub-boards, bit `i` = sub-board `i`
    my_won: u16,
    opp_won: u16,
    /// Cells that can never be played again: occupied, or inside a won sub-board
    closed: Board,
    to_move: Player,
    last_move: Option<u8>,
    ply: u16,
    legal: Board,
    rules: Rules,
}

impl GameState {
    /// Empty board with the default rules.
    pub fn new(to_move: Player) -> Self {
        Self::with_rules(to_move, Rules::default())
    }

    /// Empty board.
    pub fn with_rules(to_move: Player, rules: Rules) -> Self {
        let mut state = Self {
            my_cells: 0,
            opp_cells: 0,
            my_won: 0,
            opp_won: 0,
            closed: 0,
            to_move,
            last_move: None,
            ply: 0,
            legal: 0,
            rules,
        };
        state.legal = state.compute_legal();
        state
    }

    /// Build an arbitrary position from raw occupancy sets.
    ///
    /// Won sub-boards are derived from the cells. `ply` is set to the number of
    /// occupied cells. Fails if the sets overlap, exceed 81 bits, or if a
    /// sub-board contains a line for both sides.
    pub fn from_parts(
        my_cells: Board,
        opp_cells: Board,
        to_move: Player,
        last_move: Option<u8>,
        rules: Rules,
    ) -> Result<Self, GameError> {
        if my_cells & opp_cells != 0 {
            return Err(GameError::InvalidPosition(
                "occupancy sets overlap".to_string(),
            ));
        }
        if (my_cells | opp_cells) & !BOARD_MASK != 0 {
            return Err(GameError::InvalidPosition(
                "occupancy uses bits beyond cell 80".to_string(),
            ));
        }
        if let Some(cell) = last_move {
            if cell >= CELL_COUNT {
                return Err(GameError::InvalidPosition(format!(
                    "last move {} out of range",
                    cell
                )));
            }
        }

        let mut my_won = 0u16;
        let mut opp_won = 0u16;
        let mut closed = my_cells | opp_cells;
        for sub_board in 0..SUB_BOARD_COUNT {
            let mine = is_line_complete(sub_board_pattern(my_cells, sub_board));
            let theirs = is_line_complete(sub_board_pattern(opp_cells, sub_board));
            if mine && theirs {
                return Err(GameError::InvalidPosition(format!(
                    "sub-board {} won by both players",
                    sub_board
                )));
            }
            if mine {
                my_won |= 1 << sub_board;
            }
            if theirs {
                opp_won |= 1 << sub_board;
            }
            if mine || theirs {
                closed |= sub_board_mask(sub_board);
            }
        }

        let mut state = Self {
            my_cells,
            opp_cells,
            my_won,
            opp_won,
            closed,
            to_move,
            last_move,
            ply: (my_cells | opp_cells).count_ones() as u16,
            legal: 0,
            rules,
        };
        state.legal = state.compute_legal();
        Ok(state)
    }

    /// Replay a move sequence from the empty board.
    pub fn from_moves(to_move: Player, rules: Rules, moves: &[u8]) -> Result<Self, GameError> {
        let mut state = Self::with_rules(to_move, rules);
        for &cell in moves {
            state.play(cell)?;
        }
        Ok(state)
    }

    fn compute_legal(&self) -> Board {
        let free = !self.closed & BOARD_MASK;
        let target = match self.last_move {
            None if self.rules.forced_center_opening => 1 << CENTER_CELL,
            None => BOARD_MASK,
            Some(cell) => sub_board_mask(local_of(cell)),
        };

        // Sent to a finished or full sub-board: play anywhere still open
        match free & target {
            0 => free,
            forced => forced,
        }
    }

    /// Play `cell` for the side to move.
    ///
    /// The cell must be in the legal set; otherwise the state is left
    /// untouched and `GameError::IllegalMove` is returned.
    pub fn play(&mut self, cell: u8) -> Result<(), GameError> {
        if cell >= CELL_COUNT || self.legal & (1 << cell) == 0 {
            return Err(GameError::IllegalMove {
                cell,
                last_move: self.last_move,
            });
        }

        let bit: Board = 1 << cell;
        let sub_board = sub_board_of(cell);
        let (cells, won) = match self.to_move {
            Player::Me => (&mut self.my_cells, &mut self.my_won),
            Player::Opponent => (&mut self.opp_cells, &mut self.opp_won),
        };

        *cells |= bit;
        self.closed |= bit;
        if is_line_complete(sub_board_pattern(*cells, sub_board)) {
            *won |= 1 << sub_board;
            self.closed |= sub_board_mask(sub_board);
        }

        self.ply += 1;
        self.to_move = self.to_move.other();
        self.last_move = Some(cell);
        self.legal = self.compute_legal();
        Ok(())
    }

    /// Successor state after `cell`, leaving `self` unchanged.
    pub fn after(&self, cell: u8) -> Result<Self, GameError> {
        let mut next = *self;
        next.play(cell)?;
        Ok(next)
    }

    /// Bit set of legal cells.
    #[inline]
    pub fn legal_moves_mask(&self) -> Board {
        self.legal
    }

    /// Legal cells in ascending order.
    pub fn legal_moves(&self) -> Vec<u8> {
        self.legal_moves_iter().collect()
    }

    /// Iterator over legal cells in ascending order, without allocating.
    #[inline]
    pub fn legal_moves_iter(&self) -> impl Iterator<Item = u8> {
        BitIter(self.legal)
    }

    #[inline]
    pub fn legal_move_count(&self) -> u32 {
        self.legal.count_ones()
    }

    /// The `n`-th legal cell in ascending order.
    pub fn nth_legal_move(&self, n: usize) -> Option<u8> {
        self.legal_moves_iter().nth(n)
    }

    #[inline]
    pub fn is_legal(&self, cell: u8) -> bool {
        cell < CELL_COUNT && self.legal & (1 << cell) != 0
    }

    /// Game over: no legal move left, or a meta-line is complete.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.legal == 0 || is_line_complete(self.my_won) || is_line_complete(self.opp_won)
    }

    /// Side that completed a meta-line, if any.
    pub fn winner(&self) -> Option<Player> {
        if is_line_complete(self.my_won) {
            Some(Player::Me)
        } else if is_line_complete(self.opp_won) {
            Some(Player::Opponent)
        } else {
            None
        }
    }

    /// Score of a finished game from `Me`'s point of view: 1 win, 0 loss,
    /// 0.5 draw.
    ///
    /// Without a meta-line, the side with more won sub-boards takes the game
    /// (unless the rules disable the count tie-break).
    pub fn outcome(&self) -> f32 {
        match self.winner() {
            Some(Player::Me) => 1.0,
            Some(Player::Opponent) => 0.0,
            None if !self.rules.count_won_boards_on_stalemate => 0.5,
            None => match self.my_won.count_ones().cmp(&self.opp_won.count_ones()) {
                std::cmp::Ordering::Greater => 1.0,
                std::cmp::Ordering::Less => 0.0,
                std::cmp::Ordering::Equal => 0.5,
            },
        }
    }

    pub fn sub_board_status(&self, sub_board: u8) -> SubBoardStatus {
        if self.my_won & (1 << sub_board) != 0 {
            SubBoardStatus::WonByMe
        } else if self.opp_won & (1 << sub_board) != 0 {
            SubBoardStatus::WonByOpponent
        } else if sub_board_pattern(self.closed, sub_board) == FULL_PATTERN {
            SubBoardStatus::Drawn
        } else {
            SubBoardStatus::Open
        }
    }

    #[inline]
    pub fn my_cells(&self) -> Board {
        self.my_cells
    }

    #[inline]
    pub fn opp_cells(&self) -> Board {
        self.opp_cells
    }

    #[inline]
    pub fn my_won_sub_boards(&self) -> u16 {
        self.my_won
    }

    #[inline]
    pub fn opp_won_sub_boards(&self) -> u16 {
        self.opp_won
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn is_my_turn(&self) -> bool {
        self.to_move == Player::Me
    }

    #[inline]
    pub fn last_move(&self) -> Option<u8> {
        self.last_move
    }

    /// Number of moves played.
    #[inline]
    pub fn ply(&self) -> u16 {
        self.ply
    }

    #[inline]
    pub fn rules(&self) -> Rules {
        self.rules
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Player::Me)
    }
}

/// Iterates set bits from least significant.
struct BitIter(Board);

impl Iterator for BitIter {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}
