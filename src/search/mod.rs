//! Search module for the Connect6 engine
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition tables for caching search results
//! - Candidate generation and ordering
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod movegen;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchConfig, SearchKind, SearchLimits, SearchOutcome, SearchStats, Searcher, MATE_BOUND};
pub use movegen::{MoveGenerator, OrderingHints, ProximityGenerator};
pub use tt::{EntryType, SharedTranspositionTable, TTEntry, TTStats, TranspositionStore, TranspositionTable};
pub use zobrist::{ZobristTable, ZOBRIST};
