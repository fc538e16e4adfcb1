//! Main engine integrating book, search and game state
//!
//! [`Engine`] is what the text protocol talks to. It owns the position,
//! the transposition table, the searcher and the opening book, and
//! answers game events:
//!
//! 1. **Book**: early positions known to the opening book, when nothing tactical is on
//! 2. **Immediate win**: a six available this turn
//! 3. **Forced**: a single surviving candidate
//! 4. **Search**: iterative-deepening alpha-beta
//!
//! # Example
//!
//! ```
//! use connect6::board::{Move, Pos, Stone};
//! use connect6::config::EngineConfig;
//! use connect6::engine::{Engine, MoveSource};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.new_game(Stone::White);
//! engine.play(Move::single(Pos::new(9, 9))).unwrap();
//!
//! // White's first reply comes from the book
//! let result = engine.go().unwrap();
//! assert_eq!(result.source, MoveSource::Book);
//! assert_eq!(engine.position().turn(), 2);
//! ```

use std::time::Instant;

use log::{info, warn};

use crate::board::{Move, Position, Stone};
use crate::book::{BuiltinBook, OpeningBook};
use crate::config::EngineConfig;
use crate::error::{MoveError, Result};
use crate::eval::threats::{threat_windows, winning_cells};
use crate::search::{SearchKind, SearchOutcome, SearchStats, Searcher, TTStats, TranspositionStore, TranspositionTable};

/// Book positions never hold more stones than this
const BOOK_STONE_LIMIT: u32 = 10;

/// Which stage produced the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Opening book
    Book,
    /// Completed a six
    ImmediateWin,
    /// Only one candidate survived generation
    Forced,
    /// Regular alpha-beta search result
    Search,
}

impl From<SearchKind> for MoveSource {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::ImmediateWin => MoveSource::ImmediateWin,
            SearchKind::Forced => MoveSource::Forced,
            SearchKind::Search => MoveSource::Search,
        }
    }
}

/// Result of a move decision with statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    pub best_move: Move,
    /// Score for the side that moves
    pub score: i32,
    pub source: MoveSource,
    /// Search statistics (zeroed for book moves)
    pub stats: SearchStats,
    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl MoveResult {
    fn book(mv: Move, time_ms: u64) -> Self {
        Self {
            best_move: mv,
            score: 0,
            source: MoveSource::Book,
            stats: SearchStats::default(),
            time_ms,
        }
    }

    fn from_search(outcome: SearchOutcome, time_ms: u64) -> Self {
        Self {
            best_move: outcome.best_move,
            score: outcome.score,
            source: outcome.kind.into(),
            stats: outcome.stats,
            time_ms,
        }
    }
}

/// Game-level engine.
pub struct Engine {
    position: Position,
    tt: TranspositionTable,
    searcher: Searcher,
    book: Option<Box<dyn OpeningBook + Send>>,
    config: EngineConfig,
    /// Color the engine plays, set by `new_game`
    color: Option<Stone>,
}

impl Engine {
    /// Engine with the built-in opening book.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_book(config, Some(Box::new(BuiltinBook::new())))
    }

    pub fn with_book(config: EngineConfig, book: Option<Box<dyn OpeningBook + Send>>) -> Self {
        Self {
            position: Position::new(),
            tt: TranspositionTable::new(config.tt_capacity),
            searcher: Searcher::new(config.search_config()),
            book,
            config,
            color: None,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Color chosen at the last `new_game`.
    pub fn color(&self) -> Option<Stone> {
        self.color
    }

    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    /// Color with a completed six, if any.
    pub fn winner(&self) -> Option<Stone> {
        self.position.winner()
    }

    /// Reset the board and forget every cached search result.
    pub fn new_game(&mut self, color: Stone) {
        self.position = Position::new();
        self.tt.clear();
        self.searcher.clear_history();
        self.color = Some(color);
        info!("new game, engine plays {color}");
    }

    /// Apply a move for whichever side is to move (opponent's move).
    pub fn play(&mut self, mv: Move) -> Result<()> {
        self.position.apply(mv).map_err(|e| {
            warn!("rejected move {mv}: {e}");
            e
        })
    }

    /// Apply a move that must belong to `color`.
    pub fn place(&mut self, color: Stone, mv: Move) -> Result<()> {
        if self.position.side_to_move() != color {
            warn!("rejected move {mv}: {} is not on move", color.name());
            return Err(MoveError::WrongTurn(color.name()).into());
        }
        self.play(mv)
    }

    /// Choose a move for the side to move without playing it.
    pub fn think(&mut self) -> Result<MoveResult> {
        let start = Instant::now();
        if self.position.winner().is_some() {
            return Err(MoveError::GameOver.into());
        }

        if let Some(mv) = self.book_move() {
            info!("book move {mv}");
            return Ok(MoveResult::book(mv, elapsed_ms(start)));
        }

        let outcome =
            self.searcher
                .find_best_move(&mut self.position, &mut self.tt, self.config.search_limits())?;
        Ok(MoveResult::from_search(outcome, elapsed_ms(start)))
    }

    /// Choose a move and play it.
    pub fn go(&mut self) -> Result<MoveResult> {
        let result = self.think()?;
        self.position.apply(result.best_move)?;
        Ok(result)
    }

    /// Change one option; the searcher and table follow immediately.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let capacity = self.config.tt_capacity;
        self.config.set_option(name, value)?;
        self.sync_config(capacity);
        Ok(())
    }

    /// Legacy `depth N` command.
    pub fn apply_depth_command(&mut self, level: u32) {
        let capacity = self.config.tt_capacity;
        self.config.apply_depth_command(level);
        self.sync_config(capacity);
    }

    fn sync_config(&mut self, old_capacity: usize) {
        *self.searcher.config_mut() = self.config.search_config();
        if self.config.tt_capacity != old_capacity {
            self.tt = TranspositionTable::new(self.config.tt_capacity);
        }
    }

    /// Book move when the position is early, quiet and known.
    fn book_move(&self) -> Option<Move> {
        if !self.config.use_opening_book
            || self.position.turn() >= self.config.book_move_limit
            || self.position.board().stone_count() > BOOK_STONE_LIMIT
        {
            return None;
        }
        let book = self.book.as_ref()?;
        let board = self.position.board();
        let color = self.position.side_to_move();
        // Tactics come first
        if winning_cells(board, color, self.position.stones_this_turn()).is_some()
            || !threat_windows(board, color.opponent()).is_empty()
        {
            return None;
        }
        book.lookup(&self.position)
            .filter(|mv| self.position.check_move(mv).is_ok())
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
