//! Game rules for Connect6
//!
//! - Black opens with a single stone, then each side places two per turn
//! - Six or more in a row wins (overlines count)
//! - No captures, no forbidden moves

pub mod win;

pub use win::{check_winner, find_six, has_six_at, move_wins, run_length, DIRECTIONS};
