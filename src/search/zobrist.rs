//! Zobrist hashing for position identification
//!
//! Every (cell, color) pair gets a fixed random key; a position's
//! fingerprint is the XOR of the keys of its stones, plus a side key when
//! White is to move. Placing and removing a stone are the same XOR, so
//! incremental updates are exactly reversible.
//!
//! # Example
//!
//! ```
//! use connect6::board::{Board, Pos, Stone};
//! use connect6::search::ZOBRIST;
//!
//! let mut board = Board::new();
//! let before = ZOBRIST.hash(&board, Stone::Black);
//!
//! let pos = Pos::new(9, 9);
//! board.place_stone(pos, Stone::Black);
//! let after = ZOBRIST.hash(&board, Stone::White);
//!
//! let incremental = ZOBRIST.toggle_side(ZOBRIST.update_stone(before, pos, Stone::Black));
//! assert_eq!(incremental, after);
//! ```

use once_cell::sync::Lazy;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Board, Pos, Stone, TOTAL_CELLS};

/// Fixed seed so fingerprints are reproducible across runs.
const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Process-wide key table shared by every [`Position`](crate::board::Position).
pub static ZOBRIST: Lazy<ZobristTable> = Lazy::new(ZobristTable::new);

/// Precomputed random keys for each (cell, color) combination.
pub struct ZobristTable {
    black: [u64; TOTAL_CELLS],
    white: [u64; TOTAL_CELLS],
    /// XORed in when White is to move
    white_to_move: u64,
}

impl ZobristTable {
    /// Create a table from the fixed seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(ZOBRIST_SEED)
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let mut black = [0u64; TOTAL_CELLS];
        let mut white = [0u64; TOTAL_CELLS];
        for i in 0..TOTAL_CELLS {
            black[i] = rng.next_u64();
            white[i] = rng.next_u64();
        }

        Self {
            black,
            white,
            white_to_move: rng.next_u64(),
        }
    }

    /// Key for a stone of `stone` at `pos`. Empty has no key.
    #[inline]
    pub fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone {
            Stone::Black => self.black[pos.to_index()],
            Stone::White => self.white[pos.to_index()],
            Stone::Empty => 0,
        }
    }

    /// Full recomputation from the board.
    #[must_use]
    pub fn hash(&self, board: &Board, side_to_move: Stone) -> u64 {
        let mut h = 0u64;

        for pos in board.black.iter_ones() {
            h ^= self.black[pos.to_index()];
        }
        for pos in board.white.iter_ones() {
            h ^= self.white[pos.to_index()];
        }

        if side_to_move == Stone::White {
            h ^= self.white_to_move;
        }
        h
    }

    /// Add or remove one stone. Does not touch the side component:
    /// a Connect6 turn places two stones before the side changes.
    #[inline]
    #[must_use]
    pub fn update_stone(&self, hash: u64, pos: Pos, stone: Stone) -> u64 {
        hash ^ self.key(pos, stone)
    }

    #[inline]
    #[must_use]
    pub fn toggle_side(&self, hash: u64) -> u64 {
        hash ^ self.white_to_move
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}
