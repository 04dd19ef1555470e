//! Line protocol spoken with the game referee.
//!
//! Each turn the referee sends the opponent's last move as `row col`
//! (`-1 -1` before anyone has moved), then the number of valid actions and
//! one `row col` line per action. The bot answers with a single `row col`
//! line.

use anyhow::{anyhow, bail, Context, Result};
use games_uttt::{format_cell, try_cell_index};
use std::io::{BufRead, Write};

/// First line of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpponentLine {
    /// Input closed; the game is over.
    Eof,
    /// No move has been played yet, so we open the game.
    NoMove,
    /// The opponent played this cell.
    Move(u8),
}

/// Reads turns from the referee.
pub struct ProtocolReader<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> ProtocolReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    /// Read the next line, or None at end of input.
    fn next_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        let read = self
            .reader
            .read_line(&mut self.line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim()))
    }

    fn expect_line(&mut self, what: &str) -> Result<&str> {
        self.next_line()?
            .ok_or_else(|| anyhow!("Input ended while reading {}", what))
    }

    /// Read the opponent's move line.
    pub fn read_opponent_move(&mut self) -> Result<OpponentLine> {
        match self.next_line()? {
            None => Ok(OpponentLine::Eof),
            Some(line) => match parse_row_col(line)? {
                (-1, -1) => Ok(OpponentLine::NoMove),
                (row, col) => Ok(OpponentLine::Move(to_cell(row, col)?)),
            },
        }
    }

    /// Read the valid action count followed by that many `row col` lines.
    pub fn read_valid_actions(&mut self) -> Result<Vec<u8>> {
        let count_line = self.expect_line("the valid action count")?;
        let count: usize = count_line
            .parse()
            .with_context(|| format!("Invalid valid action count '{}'", count_line))?;
        if count > games_uttt::codec::CELL_COUNT as usize {
            bail!("Valid action count {} exceeds the board size", count);
        }

        let mut actions = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self.expect_line("a valid action")?;
            let (row, col) = parse_row_col(line)?;
            actions.push(to_cell(row, col)?);
        }
        Ok(actions)
    }
}

fn parse_row_col(line: &str) -> Result<(i32, i32)> {
    let mut parts = line.split_whitespace();
    let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Expected 'row col', got '{}'", line);
    };
    let row = row
        .parse()
        .with_context(|| format!("Invalid row in '{}'", line))?;
    let col = col
        .parse()
        .with_context(|| format!("Invalid column in '{}'", line))?;
    Ok((row, col))
}

fn to_cell(row: i32, col: i32) -> Result<u8> {
    try_cell_index(row, col).ok_or_else(|| anyhow!("Cell ({}, {}) is off the board", row, col))
}

/// Write our move as a `row col` line and flush it.
pub fn write_move<W: Write>(out: &mut W, cell: u8) -> Result<()> {
    writeln!(out, "{}", format_cell(cell)).context("Failed to write move")?;
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
