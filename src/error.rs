//! Error types shared across the engine.

use crate::board::Pos;

/// Why a move was rejected before touching the position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("coordinate '{0}' is off the board")]
    OutOfRange(String),
    #[error("cell ({}, {}) is already occupied", .0.row, .0.col)]
    Occupied(Pos),
    #[error("both stones target cell ({}, {})", .0.row, .0.col)]
    DuplicateCell(Pos),
    #[error("expected {expected} stone(s) this turn, got {got}")]
    WrongStoneCount { expected: usize, got: usize },
    #[error("it is not {0}'s turn")]
    WrongTurn(&'static str),
    #[error("the game is already over")]
    GameOver,
    #[error("malformed move text '{0}'")]
    Malformed(String),
}

/// Errors surfaced by the engine core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Rejected before mutating the position; never fatal.
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    /// The board is full. Callers treat this as a draw.
    #[error("no legal move: the board is full")]
    NoLegalMove,

    /// The incremental fingerprint diverged from a full recomputation.
    #[error("hash inconsistency: incremental {incremental:#018x}, recomputed {recomputed:#018x}")]
    HashInconsistency { incremental: u64, recomputed: u64 },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOption { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
