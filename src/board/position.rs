//! Position: board, side to move, move history and incremental fingerprint

use std::ops::{Deref, DerefMut};

use super::{Board, Move, Pos, Stone};
use crate::error::{EngineError, MoveError, Result};
use crate::rules;
use crate::search::ZOBRIST;

/// A game state the search can walk forward and back.
///
/// Black moves on even turns, White on odd turns. Turn 0 places one stone,
/// every later turn places two. The fingerprint is kept in step with the
/// board on every apply/undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    turn: u32,
    hash: u64,
    history: Vec<Move>,
}

impl Position {
    /// Empty board, Black to place the opening stone.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: 0,
            hash: 0,
            history: Vec::with_capacity(192),
        }
    }

    /// Build a position from loose stones, e.g. for analysis or tests.
    ///
    /// The turn counter is the smallest one consistent with the stone count
    /// and `side_to_move`. History starts empty.
    pub fn from_stones(black: &[Pos], white: &[Pos], side_to_move: Stone) -> Result<Self> {
        let mut board = Board::new();
        for &pos in black {
            if !board.is_empty(pos) {
                return Err(MoveError::Occupied(pos).into());
            }
            board.place_stone(pos, Stone::Black);
        }
        for &pos in white {
            if !board.is_empty(pos) {
                return Err(MoveError::Occupied(pos).into());
            }
            board.place_stone(pos, Stone::White);
        }

        let stones = board.stone_count();
        let mut turn = if stones == 0 { 0 } else { (stones + 1) / 2 };
        if (turn % 2 == 0) != (side_to_move == Stone::Black) {
            turn += 1;
        }

        let hash = ZOBRIST.hash(&board, side_to_move);
        Ok(Self {
            board,
            turn,
            hash,
            history: Vec::with_capacity(192),
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Stone {
        if self.turn % 2 == 0 { Stone::Black } else { Stone::White }
    }

    /// Completed turns so far.
    #[inline]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    /// Stones the side to move places this turn.
    #[inline]
    pub fn stones_this_turn(&self) -> usize {
        if self.turn == 0 {
            1
        } else {
            self.board.empty_count().min(2)
        }
    }

    /// Color with a completed six, if any.
    pub fn winner(&self) -> Option<Stone> {
        match self.history.last() {
            Some(last) => {
                let mover = self.side_to_move().opponent();
                rules::move_wins(&self.board, last, mover).then_some(mover)
            }
            None => rules::check_winner(&self.board),
        }
    }

    /// Game over by a six or a full board.
    pub fn is_terminal(&self) -> bool {
        self.board.is_full() || self.winner().is_some()
    }

    /// Validate `mv` for the side to move without mutating anything.
    pub fn check_move(&self, mv: &Move) -> std::result::Result<(), MoveError> {
        if self.winner().is_some() {
            return Err(MoveError::GameOver);
        }
        let expected = self.stones_this_turn();
        if mv.len() != expected {
            return Err(MoveError::WrongStoneCount { expected, got: mv.len() });
        }
        if let Some(second) = mv.second() {
            if second == mv.first() {
                return Err(MoveError::DuplicateCell(second));
            }
        }
        for pos in mv.stones() {
            if !self.board.is_empty(pos) {
                return Err(MoveError::Occupied(pos));
            }
        }
        Ok(())
    }

    /// Apply a move for the side to move. Rejected moves leave the position untouched.
    pub fn apply(&mut self, mv: Move) -> Result<()> {
        self.check_move(&mv)?;
        self.apply_unchecked(mv);
        Ok(())
    }

    /// Apply a move known to be legal (search-generated).
    #[inline]
    pub fn apply_unchecked(&mut self, mv: Move) {
        debug_assert!(mv.stones().all(|p| self.board.is_empty(p)));
        let color = self.side_to_move();
        for pos in mv.stones() {
            self.board.place_stone(pos, color);
            self.hash = ZOBRIST.update_stone(self.hash, pos, color);
        }
        self.hash = ZOBRIST.toggle_side(self.hash);
        self.turn += 1;
        self.history.push(mv);
    }

    /// Take back the last applied move.
    pub fn undo(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;
        self.turn -= 1;
        self.hash = ZOBRIST.toggle_side(self.hash);
        let color = self.side_to_move();
        for pos in mv.stones() {
            self.board.remove_stone(pos);
            self.hash = ZOBRIST.update_stone(self.hash, pos, color);
        }
        Some(mv)
    }

    /// Apply `mv` and get a guard that undoes it when dropped.
    pub fn play_scoped(&mut self, mv: Move) -> ScopedMove<'_> {
        self.apply_unchecked(mv);
        ScopedMove { position: self, pass: false }
    }

    /// Hand the turn to the opponent without placing stones (null move).
    pub fn pass_scoped(&mut self) -> ScopedMove<'_> {
        self.turn += 1;
        self.hash = ZOBRIST.toggle_side(self.hash);
        ScopedMove { position: self, pass: true }
    }

    /// Compare the incremental fingerprint with a full recomputation.
    pub fn verify_hash(&self) -> Result<()> {
        let recomputed = ZOBRIST.hash(&self.board, self.side_to_move());
        if recomputed == self.hash {
            Ok(())
        } else {
            Err(EngineError::HashInconsistency { incremental: self.hash, recomputed })
        }
    }

    /// Every stone changes color; the side to move stays the same.
    #[must_use]
    pub fn color_swapped(&self) -> Position {
        let board = self.board.color_swapped();
        let hash = ZOBRIST.hash(&board, self.side_to_move());
        Position {
            board,
            turn: self.turn,
            hash,
            history: Vec::new(),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped apply/undo. Dropping the guard restores the position on every
/// exit path of the caller, including early returns.
pub struct ScopedMove<'a> {
    position: &'a mut Position,
    pass: bool,
}

impl Drop for ScopedMove<'_> {
    fn drop(&mut self) {
        if self.pass {
            self.position.turn -= 1;
            self.position.hash = ZOBRIST.toggle_side(self.position.hash);
        } else {
            self.position.undo();
        }
    }
}

impl Deref for ScopedMove<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for ScopedMove<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}
