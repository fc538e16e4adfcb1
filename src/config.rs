//! Engine options
//!
//! [`EngineConfig`] holds every option the protocol can change. Options
//! are set by name, matched case-insensitively:
//!
//! | name | value | default |
//! |---|---|---|
//! | `searchDepthLimit` | 1..=64 | 6 |
//! | `timeLimitSeconds` | > 0, fractional allowed | 8.0 |
//! | `transpositionTableCapacity` | 1024..=16777216 entries | 1 << 20 |
//! | `enableNullMove` | bool | true |
//! | `enableLMR` | bool | true |
//! | `maxCandidateMoves` | 1..=200 | 30 |
//! | `useOpeningBook` | bool | true |
//! | `bookMoveLimit` | turn count | 6 |
//! | `verifyHashes` | bool | debug builds only |
//!
//! # Example
//!
//! ```
//! use connect6::config::EngineConfig;
//!
//! let mut config = EngineConfig::default();
//! config.set_option("timelimitseconds", "2.5").unwrap();
//! config.set_option("enableLMR", "off").unwrap();
//! assert_eq!(config.time_limit.as_millis(), 2500);
//! assert!(!config.enable_lmr);
//! assert!(config.set_option("threads", "4").is_err());
//! ```

use std::time::Duration;

use crate::error::{EngineError, Result};
use crate::search::tt::{MAX_CAPACITY, MIN_CAPACITY};
use crate::search::{SearchConfig, SearchLimits};

pub const MAX_DEPTH_LIMIT: i8 = 64;
pub const MAX_CANDIDATE_LIMIT: usize = 200;

/// Every option the engine exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub search_depth_limit: i8,
    pub time_limit: Duration,
    pub tt_capacity: usize,
    pub enable_null_move: bool,
    pub enable_lmr: bool,
    pub max_candidate_moves: usize,
    pub use_opening_book: bool,
    /// Book is consulted only before this many turns have been played
    pub book_move_limit: u32,
    pub verify_hashes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_depth_limit: 6,
            time_limit: Duration::from_secs(8),
            tt_capacity: 1 << 20,
            enable_null_move: true,
            enable_lmr: true,
            max_candidate_moves: 30,
            use_opening_book: true,
            book_move_limit: 6,
            verify_hashes: cfg!(debug_assertions),
        }
    }
}

fn invalid(name: &str, value: &str) -> EngineError {
    EngineError::InvalidOption {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}

fn parse_in_range<T>(name: &str, value: &str, min: T, max: T) -> Result<T>
where
    T: std::str::FromStr + PartialOrd,
{
    let v = value.parse::<T>().map_err(|_| invalid(name, value))?;
    if v < min || v > max {
        return Err(invalid(name, value));
    }
    Ok(v)
}

impl EngineConfig {
    /// Set one option by name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match name.to_ascii_lowercase().as_str() {
            "searchdepthlimit" => {
                self.search_depth_limit = parse_in_range(name, value, 1, MAX_DEPTH_LIMIT)?;
            }
            "timelimitseconds" => {
                let secs: f64 = parse_in_range(name, value, 0.0, 3600.0)?;
                if secs.is_nan() || secs <= 0.0 {
                    return Err(invalid(name, value));
                }
                self.time_limit = Duration::from_secs_f64(secs);
            }
            "transpositiontablecapacity" => {
                self.tt_capacity = parse_in_range(name, value, MIN_CAPACITY, MAX_CAPACITY)?;
            }
            "enablenullmove" => self.enable_null_move = parse_bool(name, value)?,
            "enablelmr" => self.enable_lmr = parse_bool(name, value)?,
            "maxcandidatemoves" => {
                self.max_candidate_moves = parse_in_range(name, value, 1, MAX_CANDIDATE_LIMIT)?;
            }
            "useopeningbook" => self.use_opening_book = parse_bool(name, value)?,
            "bookmovelimit" => self.book_move_limit = parse_in_range(name, value, 0, u32::MAX)?,
            "verifyhashes" => self.verify_hashes = parse_bool(name, value)?,
            _ => return Err(EngineError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Legacy `depth N` command: N seconds, with the depth cap scaled to match.
    pub fn apply_depth_command(&mut self, level: u32) {
        self.time_limit = Duration::from_secs(u64::from(level.max(1)));
        self.search_depth_limit = match level {
            0..=2 => 4,
            3..=8 => 6,
            _ => 7,
        };
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            enable_null_move: self.enable_null_move,
            enable_lmr: self.enable_lmr,
            max_candidates: self.max_candidate_moves,
            verify_hashes: self.verify_hashes,
            ..SearchConfig::default()
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits::new(self.search_depth_limit, self.time_limit)
    }
}
