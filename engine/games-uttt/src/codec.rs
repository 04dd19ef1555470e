//! Mapping between board coordinates and packed cell indices.
//!
//! Cells are packed sub-board major: the nine cells of sub-board `b` occupy
//! indices `9 * b .. 9 * b + 9`, row-major inside the 3x3 sub-board.
//!
//! ```text
//!  0  1  2 |  9 10 11 | 18 19 20
//!  3  4  5 | 12 13 14 | 21 22 23
//!  6  7  8 | 15 16 17 | 24 25 26
//! ---------|----------|---------
//! 27 28 29 | 36 37 38 | 45 46 47
//! 30 31 32 | 39 40 41 | 48 49 50
//! 33 34 35 | 42 43 44 | 51 52 53
//! ---------|----------|---------
//! 54 55 56 | 63 64 65 | 72 73 74
//! 57 58 59 | 66 67 68 | 75 76 77
//! 60 61 62 | 69 70 71 | 78 79 80
//! ```
//!
//! With this packing a sub-board is a contiguous 9-bit slice of the 81-bit
//! occupancy set, and `cell % 9` is the position of the cell inside its
//! sub-board, which is also the index of the sub-board the opponent is sent to.

/// Number of cells on the full board.
pub const CELL_COUNT: u8 = 81;

/// Number of sub-boards (and cells per sub-board).
pub const SUB_BOARD_COUNT: u8 = 9;

/// Center cell of the center sub-board, the forced opening move.
pub const CENTER_CELL: u8 = 40;

const fn build_index_table() -> [[u8; 9]; 9] {
    let mut table = [[0u8; 9]; 9];
    let mut row = 0;
    while row < 9 {
        let mut col = 0;
        while col < 9 {
            let sub_board = (row / 3) * 3 + col / 3;
            let local = (row % 3) * 3 + col % 3;
            table[row][col] = (sub_board * 9 + local) as u8;
            col += 1;
        }
        row += 1;
    }
    table
}

const fn build_row_col_table() -> [(u8, u8); 81] {
    let mut table = [(0u8, 0u8); 81];
    let mut cell = 0;
    while cell < 81 {
        let sub_board = cell / 9;
        let local = cell % 9;
        let row = (sub_board / 3) * 3 + local / 3;
        let col = (sub_board % 3) * 3 + local % 3;
        table[cell] = (row as u8, col as u8);
        cell += 1;
    }
    table
}

const INDEX_OF: [[u8; 9]; 9] = build_index_table();
const ROW_COL_OF: [(u8, u8); 81] = build_row_col_table();

/// Packed cell index for a (row, col) pair. Both must be in `0..9`.
#[inline]
pub const fn cell_index(row: u8, col: u8) -> u8 {
    INDEX_OF[row as usize][col as usize]
}

/// (row, col) pair of a packed cell index. `cell` must be in `0..81`.
#[inline]
pub const fn row_col(cell: u8) -> (u8, u8) {
    ROW_COL_OF[cell as usize]
}

/// Index of the sub-board containing `cell`.
#[inline]
pub const fn sub_board_of(cell: u8) -> u8 {
    cell / SUB_BOARD_COUNT
}

/// Position of `cell` inside its sub-board (0-8, row-major).
#[inline]
pub const fn local_of(cell: u8) -> u8 {
    cell % SUB_BOARD_COUNT
}

/// Checked conversion for coordinates coming off the wire.
///
/// Returns `None` for anything outside `0..9`, including the `-1 -1`
/// "no move yet" sentinel.
pub fn try_cell_index(row: i32, col: i32) -> Option<u8> {
    if (0..9).contains(&row) && (0..9).contains(&col) {
        Some(cell_index(row as u8, col as u8))
    } else {
        None
    }
}

/// Wire representation of a cell: `"row col"`.
pub fn format_cell(cell: u8) -> String {
    let (row, col) = row_col(cell);
    format!("{} {}", row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_positions() {
        assert_eq!(cell_index(0, 0), 0);
        assert_eq!(cell_index(0, 3), 9);
        assert_eq!(cell_index(1, 0), 3);
        assert_eq!(cell_index(4, 4), CENTER_CELL);
        assert_eq!(cell_index(4, 7), 49);
        assert_eq!(cell_index(8, 8), 80);
        assert_eq!(row_col(40), (4, 4));
        assert_eq!(row_col(26), (2, 8));
    }

    #[test]
    fn test_round_trip_all_cells() {
        for cell in 0..CELL_COUNT {
            let (row, col) = row_col(cell);
            assert!(row < 9 && col < 9);
            assert_eq!(cell_index(row, col), cell);
        }
        for row in 0..9 {
            for col in 0..9 {
                assert_eq!(row_col(cell_index(row, col)), (row, col));
            }
        }
    }

    #[test]
    fn test_sub_board_slices_are_contiguous() {
        for sub_board in 0..SUB_BOARD_COUNT {
            for local in 0..9 {
                let cell = sub_board * 9 + local;
                assert_eq!(sub_board_of(cell), sub_board);
                assert_eq!(local_of(cell), local);
                let (row, col) = row_col(cell);
                assert_eq!((row / 3) * 3 + col / 3, sub_board);
            }
        }
    }

    #[test]
    fn test_try_cell_index() {
        assert_eq!(try_cell_index(-1, -1), None);
        assert_eq!(try_cell_index(9, 0), None);
        assert_eq!(try_cell_index(0, 9), None);
        assert_eq!(try_cell_index(4, 4), Some(CENTER_CELL));
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(0), "0 0");
        assert_eq!(format_cell(40), "4 4");
        assert_eq!(format_cell(47), "3 8");
    }
}
