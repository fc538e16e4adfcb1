//! Evaluation module for Connect6 positions
//!
//! - [`recognizer`]: line shapes (twos through sixes) and their combinations
//! - [`threats`]: six-cell windows, immediate wins and forced blocks
//! - [`patterns`]: shape weights and score bands
//! - [`heuristic`]: the [`Evaluator`] capability and its pattern-based implementation

pub mod heuristic;
pub mod patterns;
pub mod recognizer;
pub mod threats;

pub use heuristic::{Evaluator, PatternEvaluator};
pub use patterns::{PatternScore, ScoreBand};
pub use recognizer::{classify, classify_at, Direction, Openness, Pattern, Shape};
pub use threats::Threat;
