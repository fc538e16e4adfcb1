//! Connect6 search engine
//!
//! A time-bounded Connect6 engine:
//! - Standard 19x19 board
//! - Black opens with one stone, every later turn places two
//! - Six or more in a row wins
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Bitboards, moves and the position with its incremental fingerprint
//! - [`rules`]: Six-in-a-row detection
//! - [`eval`]: Pattern recognition, threat windows and the evaluator
//! - [`search`]: Zobrist keys, transposition tables, move generation, alpha-beta
//! - [`book`]: Opening book consulted before search
//! - [`config`]: Engine options
//! - [`engine`]: Game-level facade integrating all components
//! - [`protocol`]: Text command parser used by the binary
//!
//! # Quick Start
//!
//! ```
//! use connect6::{Engine, EngineConfig, Move, Pos, Stone};
//!
//! let mut config = EngineConfig::default();
//! config.search_depth_limit = 2;
//! config.max_candidate_moves = 8;
//!
//! let mut engine = Engine::new(config);
//! engine.new_game(Stone::White);
//! engine.play(Move::single(Pos::new(9, 9))).unwrap();
//!
//! let result = engine.go().unwrap();
//! println!("engine plays {} ({:?})", result.best_move, result.source);
//! assert_eq!(result.best_move.len(), 2);
//! ```
//!
//! # Search Priority
//!
//! 1. Opening book, early and only when nothing tactical is on
//! 2. Immediate six
//! 3. Forced block when the opponent threatens to complete
//! 4. Iterative-deepening PVS with null-move pruning, LMR and aspiration windows,
//!    ending in a short quiescence search over threat moves

pub mod board;
pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod protocol;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Move, Pos, Position, Stone, BOARD_SIZE, CENTER};
pub use config::EngineConfig;
pub use engine::{Engine, MoveResult, MoveSource};
pub use error::{EngineError, MoveError};
pub use search::{SearchLimits, SearchOutcome, Searcher, TranspositionTable};
