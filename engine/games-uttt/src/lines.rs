//! Three-in-a-row detection on 9-bit patterns.
//!
//! The same test runs on a single sub-board (one player's cells inside it)
//! and on the meta-board (one player's won sub-boards). Bit `i` of a pattern
//! is position `i` of the 3x3 grid:
//!
//! ```text
//! 0 1 2
//! 3 4 5
//! 6 7 8
//! ```

/// Rows, columns, then the two diagonals.
pub const WIN_LINES: [u16; 8] = [
    0x007, 0x038, 0x1c0, // rows
    0x049, 0x092, 0x124, // columns
    0x111, 0x054, // diagonals
];

/// All nine positions of a 3x3 grid.
pub const FULL_PATTERN: u16 = 0x1ff;

/// True when `pattern` contains at least one complete line.
#[inline]
pub fn is_line_complete(pattern: u16) -> bool {
    WIN_LINES.iter().any(|&line| pattern & line == line)
}
