//! Opening book
//!
//! A read-only oracle consulted before search in the first turns of a
//! game. Lines are keyed by position fingerprint, so the move order that
//! reached a position does not matter.
//!
//! # Example
//!
//! ```
//! use connect6::board::{Position, CENTER};
//! use connect6::book::{BuiltinBook, OpeningBook};
//!
//! let book = BuiltinBook::new();
//! let first = book.lookup(&Position::new()).unwrap();
//! assert_eq!(first.first(), CENTER);
//! assert!(first.is_single());
//! ```

use std::collections::HashMap;

use crate::board::{Move, Pos, Position, CENTER};

/// Opening knowledge the engine may consult instead of searching.
pub trait OpeningBook {
    /// Recommended move for the side to move, if the position is known.
    fn lookup(&self, position: &Position) -> Option<Move>;
}

/// One recommended continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub mv: Move,
    /// Preference among the continuations of one position (higher is better)
    pub score: i32,
    pub name: &'static str,
}

/// Tengen opening with White's standard replies and Black's follow-ups
/// to the double diagonal.
#[derive(Debug, Clone)]
pub struct BuiltinBook {
    lines: HashMap<u64, Vec<BookEntry>>,
}

const fn pair(a: (u8, u8), b: (u8, u8)) -> Move {
    Move::pair(Pos { row: a.0, col: a.1 }, Pos { row: b.0, col: b.1 })
}

const TENGEN: Move = Move::single(CENTER);

const DOUBLE_DIAGONAL: Move = pair((8, 8), (10, 10));

const WHITE_REPLIES: [(Move, i32, &str); 8] = [
    (DOUBLE_DIAGONAL, 95, "double diagonal"),
    (pair((8, 10), (10, 8)), 90, "anti-diagonal"),
    (pair((7, 8), (11, 10)), 85, "large knight"),
    (pair((8, 7), (10, 11)), 85, "large knight, turned"),
    (pair((9, 7), (9, 11)), 80, "horizontal split"),
    (pair((7, 9), (11, 9)), 80, "vertical split"),
    (pair((8, 9), (10, 9)), 75, "vertical contact"),
    (pair((9, 8), (9, 10)), 75, "horizontal contact"),
];

const DIAGONAL_FOLLOW_UPS: [(Move, i32, &str); 5] = [
    (pair((10, 8), (8, 10)), 90, "cross"),
    (pair((9, 7), (7, 9)), 85, "territory"),
    (pair((11, 9), (9, 11)), 85, "outer influence"),
    (pair((10, 9), (9, 10)), 80, "direct pressure"),
    (pair((8, 9), (9, 8)), 80, "surround"),
];

impl BuiltinBook {
    pub fn new() -> Self {
        let mut book = Self { lines: HashMap::new() };
        book.add_line(&[], &[(TENGEN, 100, "tengen")]);
        book.add_line(&[TENGEN], &WHITE_REPLIES);
        book.add_line(&[TENGEN, DOUBLE_DIAGONAL], &DIAGONAL_FOLLOW_UPS);
        book
    }

    /// Register `replies` for the position reached by playing `moves`
    /// from the empty board.
    fn add_line(&mut self, moves: &[Move], replies: &[(Move, i32, &'static str)]) {
        let mut position = Position::new();
        for &mv in moves {
            position.apply_unchecked(mv);
        }
        let entries = self.lines.entry(position.hash()).or_default();
        entries.extend(replies.iter().map(|&(mv, score, name)| BookEntry { mv, score, name }));
    }

    /// Every continuation recorded for `position`, in insertion order.
    pub fn entries(&self, position: &Position) -> &[BookEntry] {
        self.lines.get(&position.hash()).map_or(&[][..], Vec::as_slice)
    }

    /// Number of positions in the book.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for BuiltinBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OpeningBook for BuiltinBook {
    /// Highest-scored legal continuation; ties go to the earlier entry.
    fn lookup(&self, position: &Position) -> Option<Move> {
        let mut best: Option<&BookEntry> = None;
        for entry in self.entries(position) {
            if position.check_move(&entry.mv).is_err() {
                continue;
            }
            if best.map_or(true, |b| entry.score > b.score) {
                best = Some(entry);
            }
        }
        best.map(|e| e.mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Stone;

    #[test]
    fn test_book_positions() {
        let book = BuiltinBook::new();
        assert_eq!(book.len(), 3);
        assert!(!book.is_empty());
    }

    #[test]
    fn test_white_reply_to_tengen() {
        let book = BuiltinBook::new();
        let mut position = Position::new();
        position.apply(TENGEN).unwrap();
        assert_eq!(book.entries(&position).len(), 8);
        assert_eq!(book.lookup(&position), Some(DOUBLE_DIAGONAL));
    }

    #[test]
    fn test_follow_up_independent_of_move_order() {
        let book = BuiltinBook::new();
        let black = [CENTER];
        let white = [Pos::new(10, 10), Pos::new(8, 8)];
        let position = Position::from_stones(&black, &white, Stone::Black).unwrap();
        assert_eq!(book.lookup(&position), Some(pair((10, 8), (8, 10))));
    }

    #[test]
    fn test_equal_scores_keep_first_entry() {
        let position = Position::new();
        let entries = vec![
            BookEntry { mv: Move::single(Pos::new(9, 8)), score: 50, name: "a" },
            BookEntry { mv: Move::single(Pos::new(9, 10)), score: 70, name: "b" },
            BookEntry { mv: Move::single(Pos::new(8, 9)), score: 70, name: "c" },
        ];
        let book = BuiltinBook { lines: HashMap::from([(position.hash(), entries)]) };
        assert_eq!(book.lookup(&position), Some(Move::single(Pos::new(9, 10))));
    }

    #[test]
    fn test_illegal_entries_skipped() {
        let position = Position::new();
        let entries = vec![
            BookEntry { mv: DOUBLE_DIAGONAL, score: 99, name: "two stones on turn 0" },
            BookEntry { mv: TENGEN, score: 10, name: "tengen" },
        ];
        let book = BuiltinBook { lines: HashMap::from([(position.hash(), entries)]) };
        assert_eq!(book.lookup(&position), Some(TENGEN));
    }

    #[test]
    fn test_unknown_position() {
        let book = BuiltinBook::new();
        let mut position = Position::new();
        position.apply(Move::single(Pos::new(3, 3))).unwrap();
        assert_eq!(book.lookup(&position), None);
        assert!(book.entries(&position).is_empty());
    }
}
