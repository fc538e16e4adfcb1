//! Board representation for Connect6
//!
//! - [`Bitboard`]: 361-cell bitset
//! - [`Board`]: two bitboards, one per color
//! - [`Move`]: one or two stones placed in a single turn
//! - [`Position`]: board + side to move + history + incremental fingerprint
//!
//! # Example
//!
//! ```
//! use connect6::board::{Move, Pos, Position, Stone};
//!
//! let mut position = Position::new();
//! position.apply(Move::single(Pos::new(9, 9))).unwrap();
//! assert_eq!(position.side_to_move(), Stone::White);
//! assert_eq!(position.stones_this_turn(), 2);
//! ```

pub mod bitboard;
pub mod board;
pub mod position;

#[cfg(test)]
mod tests;

use std::fmt;

use crate::error::MoveError;

// Re-exports
pub use bitboard::Bitboard;
pub use board::Board;
pub use position::{Position, ScopedMove};

/// Board size (19x19)
pub const BOARD_SIZE: usize = 19;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 361

/// Stones in a row needed to win
pub const WIN_LENGTH: usize = 6;

/// Center cell (tengen)
pub const CENTER: Pos = Pos { row: 9, col: 9 };

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stone::Black => "black",
            Stone::White => "white",
            Stone::Empty => "empty",
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    /// Checked constructor for coordinates coming from outside the engine.
    #[inline]
    pub fn try_new(row: i32, col: i32) -> Option<Self> {
        if Self::is_valid(row, col) {
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            Some(Self { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Step `n` cells along `(dr, dc)`; `None` when that leaves the board.
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, n: i32) -> Option<Pos> {
        Self::try_new(self.row as i32 + dr * n, self.col as i32 + dc * n)
    }

    /// Chebyshev distance to the center cell.
    #[inline]
    pub fn center_distance(self) -> u8 {
        let dr = (self.row as i32 - CENTER.row as i32).unsigned_abs();
        let dc = (self.col as i32 - CENTER.col as i32).unsigned_abs();
        dr.max(dc) as u8
    }

    /// Parse two-letter notation: column letter then row letter counted
    /// from the bottom, both in `A..=S`. `JJ` is the center.
    pub fn from_notation(text: &str) -> Result<Pos, MoveError> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(MoveError::Malformed(text.to_string()));
        }
        let col = letter_index(bytes[0]);
        let row_from_bottom = letter_index(bytes[1]);
        match (col, row_from_bottom) {
            (Some(col), Some(rb)) => Ok(Pos::new((BOARD_SIZE - 1 - rb) as u8, col as u8)),
            _ => Err(MoveError::OutOfRange(text.to_string())),
        }
    }

    #[must_use]
    pub fn to_notation(self) -> String {
        let col = (b'A' + self.col) as char;
        let row = (b'A' + (BOARD_SIZE as u8 - 1 - self.row)) as char;
        format!("{col}{row}")
    }
}

fn letter_index(byte: u8) -> Option<usize> {
    let upper = byte.to_ascii_uppercase();
    if (b'A'..b'A' + BOARD_SIZE as u8).contains(&upper) {
        Some((upper - b'A') as usize)
    } else {
        None
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

/// One turn: a single stone (opening move) or two stones.
///
/// The first stone is the primary one; generators put the stone that
/// carries the tactical point first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    first: Pos,
    second: Option<Pos>,
}

impl Move {
    #[inline]
    pub const fn single(pos: Pos) -> Self {
        Self { first: pos, second: None }
    }

    #[inline]
    pub const fn pair(first: Pos, second: Pos) -> Self {
        debug_assert!(first.row != second.row || first.col != second.col, "pair needs two distinct cells");
        Self { first, second: Some(second) }
    }

    #[inline]
    pub fn first(&self) -> Pos {
        self.first
    }

    #[inline]
    pub fn second(&self) -> Option<Pos> {
        self.second
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.second.is_some() { 2 } else { 1 }
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        self.second.is_none()
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.first == pos || self.second == Some(pos)
    }

    /// Stones of this move in placement order.
    pub fn stones(&self) -> impl Iterator<Item = Pos> {
        std::iter::once(self.first).chain(self.second)
    }

    /// Same cells regardless of stone order.
    pub fn same_cells(&self, other: &Move) -> bool {
        match (self.second, other.second) {
            (None, None) => self.first == other.first,
            (Some(a), Some(b)) => {
                (self.first == other.first && a == b) || (self.first == b && a == other.first)
            }
            _ => false,
        }
    }

    /// Parse 2-letter (single) or 4-letter (pair) notation.
    /// A 4-letter move naming the same cell twice is a single stone.
    pub fn from_notation(text: &str) -> Result<Move, MoveError> {
        let text = text.trim();
        if !text.is_ascii() {
            return Err(MoveError::Malformed(text.to_string()));
        }
        match text.len() {
            2 => Ok(Move::single(Pos::from_notation(text)?)),
            4 => {
                let a = Pos::from_notation(&text[..2])?;
                let b = Pos::from_notation(&text[2..])?;
                Ok(if a == b { Move::single(a) } else { Move::pair(a, b) })
            }
            _ => Err(MoveError::Malformed(text.to_string())),
        }
    }

    #[must_use]
    pub fn to_notation(&self) -> String {
        self.stones().map(Pos::to_notation).collect()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}
