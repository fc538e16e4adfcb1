//! Alpha-Beta search with iterative deepening and transposition table
//!
//! Negamax over two-stone turns with:
//! - iterative deepening under a wall-clock budget
//! - principal variation search and aspiration windows
//! - null-move pruning, disabled while the side to move faces a threat
//! - late move reductions for quiet, low-ranked candidates
//! - killer moves, per-cell history and transposition moves for ordering
//! - a short quiescence search at the horizon over threat-making and
//!   threat-blocking moves
//!
//! Every node that plays a move does so through [`Position::play_scoped`],
//! so the position is restored on every exit path, including cancellation
//! and errors.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use connect6::board::Position;
//! use connect6::search::{SearchConfig, SearchLimits, Searcher, TranspositionTable};
//!
//! let mut searcher = Searcher::new(SearchConfig::default());
//! let mut tt = TranspositionTable::new(1 << 12);
//! let mut position = Position::new();
//!
//! let limits = SearchLimits::new(2, Duration::from_secs(2));
//! let outcome = searcher.find_best_move(&mut position, &mut tt, limits).unwrap();
//! assert!(outcome.best_move.is_single());
//! assert!(outcome.best_move.first().center_distance() <= 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::board::{Move, Position, Stone, TOTAL_CELLS};
use crate::error::{EngineError, MoveError, Result};
use crate::eval::threats::{blockers_needed, threat_windows, winning_cells, Threat};
use crate::eval::{Evaluator, PatternEvaluator, PatternScore};

use super::movegen::{complete_move, rank_cells, MoveGenerator, OrderingHints, ProximityGenerator};
use super::tt::{EntryType, TTEntry, TranspositionStore};

/// Infinity score for alpha-beta bounds
const INF: i32 = PatternScore::WIN + 1;

/// Scores at or beyond this magnitude are proven wins or losses
pub const MATE_BOUND: i32 = PatternScore::WIN - 1_000;

/// Deepest ply tracked by the killer table
const MAX_PLY: usize = 64;

/// Wall-clock check interval (nodes - 1)
const TIME_CHECK_MASK: u64 = 1023;

const NULL_MOVE_MIN_DEPTH: i8 = 3;
const LMR_MIN_RANK: usize = 3;
const LMR_DEEP_RANK: usize = 8;
const LMR_MIN_DEPTH: i8 = 3;

/// Plies of tactical extension past the horizon
const QS_MAX_PLIES: u8 = 2;
/// Moves tried per quiescence node
const QS_WIDTH: usize = 6;

/// History entries saturate here
const HISTORY_LIMIT: i32 = 1 << 16;

/// Iterative deepening stops widening past this half-width and opens fully
const ASPIRATION_LIMIT: i32 = PatternScore::OPEN_FOUR;

/// Tunable search behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub enable_null_move: bool,
    pub enable_lmr: bool,
    /// Cap on candidates per node
    pub max_candidates: usize,
    /// A pass must still beat beta by this much to prune
    pub null_move_margin: i32,
    /// Initial aspiration half-width
    pub aspiration_delta: i32,
    /// Recompute the fingerprint at every node and abort on mismatch
    pub verify_hashes: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable_null_move: true,
            enable_lmr: true,
            max_candidates: super::movegen::DEFAULT_MAX_MOVES,
            null_move_margin: 500,
            aspiration_delta: 500,
            verify_hashes: cfg!(debug_assertions),
        }
    }
}

/// Depth and time caps for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: i8,
    pub time_budget: Duration,
}

impl SearchLimits {
    pub fn new(max_depth: i8, time_budget: Duration) -> Self {
        Self { max_depth, time_budget }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::new(6, Duration::from_secs(8))
    }
}

/// Search statistics; observational only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub nodes: u64,
    pub nps: u64,
    /// Last iteration that finished (0 when none did)
    pub depth_completed: i8,
    pub tt_probes: u64,
    pub tt_hits: u64,
    pub elapsed: Duration,
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    pub null_move_tries: u64,
    /// Moves searched at reduced depth
    pub lmr_reductions: u64,
    /// Reduced moves that beat alpha and were searched again at full depth
    pub lmr_researches: u64,
    /// Nodes visited inside quiescence (also counted in `nodes`)
    pub qs_nodes: u64,
}

impl SearchStats {
    /// Fraction of probes that found an entry
    pub fn transposition_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64
        }
    }

    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }
}

/// How the returned move was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// A six was available this turn
    ImmediateWin,
    /// Only one candidate survived generation
    Forced,
    /// Iterative deepening
    Search,
}

/// Result of [`Searcher::find_best_move`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best_move: Move,
    /// Score for the side to move
    pub score: i32,
    pub kind: SearchKind,
    pub stats: SearchStats,
}

/// Aspiration window around the previous iteration's score, widened
/// geometrically on each failure.
struct AspirationWindow {
    alpha: i32,
    beta: i32,
    delta: i32,
}

impl AspirationWindow {
    fn new(score: i32, depth: i8, delta: i32) -> Self {
        if depth <= 1 || score.abs() >= MATE_BOUND || delta <= 0 {
            return Self { alpha: -INF, beta: INF, delta };
        }
        Self {
            alpha: (score - delta).max(-INF),
            beta: (score + delta).min(INF),
            delta,
        }
    }

    #[inline]
    fn fails_low(&self, score: i32) -> bool {
        self.alpha != -INF && score <= self.alpha
    }

    #[inline]
    fn fails_high(&self, score: i32) -> bool {
        self.beta != INF && score >= self.beta
    }

    fn widen_down(&mut self, score: i32) {
        self.delta = self.delta.saturating_mul(2);
        self.alpha = if self.delta > ASPIRATION_LIMIT { -INF } else { (score - self.delta).max(-INF) };
    }

    fn widen_up(&mut self, score: i32) {
        self.delta = self.delta.saturating_mul(2);
        self.beta = if self.delta > ASPIRATION_LIMIT { INF } else { (score + self.delta).min(INF) };
    }
}

/// Outcome of the terminal and forced-loss checks at a node.
enum NodeState {
    /// Score for the side to move, no search needed
    Decided(i32),
    /// Still open; carries the opponent's threat windows
    Open(Vec<Threat>),
}

/// Terminal and forced outcomes, scored by distance from the root.
fn node_state(position: &Position, ply: usize) -> NodeState {
    let ply_score = ply as i32;
    if position.winner().is_some() {
        return NodeState::Decided(-(PatternScore::WIN - ply_score));
    }
    let stones = position.stones_this_turn();
    if stones == 0 {
        return NodeState::Decided(0);
    }
    let color = position.side_to_move();
    if winning_cells(position.board(), color, stones).is_some() {
        return NodeState::Decided(PatternScore::WIN - ply_score - 1);
    }
    let threats = threat_windows(position.board(), color.opponent());
    if blockers_needed(&threats) > stones {
        return NodeState::Decided(-(PatternScore::WIN - ply_score - 2));
    }
    NodeState::Open(threats)
}

#[inline]
fn color_index(color: Stone) -> usize {
    match color {
        Stone::White => 1,
        _ => 0,
    }
}

/// Mate scores are stored relative to the node, not the root.
#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

// =============================================================================
// Searcher
// =============================================================================

/// Single-threaded search driver.
///
/// The evaluator and generator are capabilities, so either can be swapped
/// for a stub in tests. The transposition table is passed into each call
/// and never owned.
pub struct Searcher<E = PatternEvaluator, G = ProximityGenerator> {
    evaluator: E,
    generator: G,
    config: SearchConfig,
    stop: Arc<AtomicBool>,
    killers: [[Option<Move>; 2]; MAX_PLY],
    /// Cutoff credit per (color, cell)
    history: [[i32; TOTAL_CELLS]; 2],
    deadline: Option<Instant>,
    stopped: bool,
    stats: SearchStats,
}

impl Searcher {
    /// Searcher with the pattern evaluator and proximity generator.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_components(PatternEvaluator, ProximityGenerator::default(), config)
    }
}

impl<E: Evaluator, G: MoveGenerator> Searcher<E, G> {
    pub fn with_components(evaluator: E, generator: G, config: SearchConfig) -> Self {
        Self {
            evaluator,
            generator,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            killers: [[None; 2]; MAX_PLY],
            history: [[0; TOTAL_CELLS]; 2],
            deadline: None,
            stopped: false,
            stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SearchConfig {
        &mut self.config
    }

    /// Flag another thread may set to end the current search early.
    /// It is cleared when the next search starts.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Forget killer moves and cutoff history (new game).
    pub fn clear_history(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
        self.history = [[0; TOTAL_CELLS]; 2];
    }

    /// Cutoff history for `color`, indexed by cell.
    pub fn history(&self, color: Stone) -> &[i32; TOTAL_CELLS] {
        &self.history[color_index(color)]
    }

    /// Choose a move for the side to move.
    ///
    /// Fails with `NoLegalMove` on a full board, `InvalidMove(GameOver)`
    /// when a six is already on the board, and `HashInconsistency` when
    /// hash verification is enabled and the fingerprint is corrupt. The
    /// position is unchanged when this returns.
    pub fn find_best_move<T: TranspositionStore>(
        &mut self,
        position: &mut Position,
        tt: &mut T,
        limits: SearchLimits,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        self.stats = SearchStats::default();
        self.stopped = false;
        self.stop.store(false, Ordering::Relaxed);
        self.deadline = start.checked_add(limits.time_budget);

        if position.winner().is_some() {
            return Err(MoveError::GameOver.into());
        }
        let stones = position.stones_this_turn();
        if stones == 0 {
            return Err(EngineError::NoLegalMove);
        }
        if self.config.verify_hashes {
            position.verify_hash()?;
        }
        tt.new_search();
        self.age_history();

        let color = position.side_to_move();
        if let Some(cells) = winning_cells(position.board(), color, stones) {
            let ranked = rank_cells(position.board(), color);
            if let Some(mv) = complete_move(position.board(), &cells, &ranked, stones) {
                return Ok(self.finish(mv, PatternScore::WIN - 1, SearchKind::ImmediateWin, start));
            }
        }

        let tt_move = tt.probe(position.hash()).and_then(|e| e.best_move);
        let hints = OrderingHints {
            tt_move,
            killers: [None; 2],
            history: Some(&self.history[color_index(color)]),
            max_moves: self.config.max_candidates,
        };
        let mut root_moves = self.generator.candidates(position, &hints);
        let Some(&first) = root_moves.first() else {
            return Err(EngineError::NoLegalMove);
        };
        if root_moves.len() == 1 {
            let score = {
                let child = position.play_scoped(first);
                -self.evaluator.score(&child)
            };
            return Ok(self.finish(first, score, SearchKind::Forced, start));
        }

        let mut best_move = first;
        let mut best_score = self.evaluator.score(position);
        let mut prev_depth_time = Duration::ZERO;

        for depth in 1..=limits.max_depth.max(1) {
            self.check_time();
            if self.stopped {
                break;
            }
            let depth_start = Instant::now();
            let mut window = AspirationWindow::new(best_score, depth, self.config.aspiration_delta);

            let iteration = loop {
                let result =
                    self.search_root(position, tt, &root_moves, depth, window.alpha, window.beta)?;
                if self.stopped {
                    break result;
                }
                match result {
                    Some((_, score)) if window.fails_low(score) => window.widen_down(score),
                    Some((_, score)) if window.fails_high(score) => window.widen_up(score),
                    _ => break result,
                }
            };

            if self.stopped {
                // A proven win from a finished child survives an interrupted iteration
                if let Some((mv, score)) = iteration.filter(|&(_, s)| s >= MATE_BOUND) {
                    best_move = mv;
                    best_score = score;
                }
                break;
            }
            let Some((mv, score)) = iteration else { break };

            best_move = mv;
            best_score = score;
            self.stats.depth_completed = depth;
            if let Some(idx) = root_moves.iter().position(|m| *m == mv) {
                root_moves[..=idx].rotate_right(1);
            }
            debug!(
                "depth {} score {} nodes {} best {}",
                depth, score, self.stats.nodes, mv
            );

            if score.abs() >= MATE_BOUND {
                break;
            }

            // Skip an iteration that would not finish in the remaining budget
            let depth_time = depth_start.elapsed();
            let remaining = limits.time_budget.saturating_sub(start.elapsed());
            let estimated_next = if prev_depth_time.is_zero() {
                depth_time * 3
            } else {
                let bf = (depth_time.as_secs_f64() / prev_depth_time.as_secs_f64()).clamp(1.5, 8.0);
                depth_time.mul_f64(bf)
            };
            prev_depth_time = depth_time;
            if estimated_next > remaining {
                break;
            }
        }

        if self.stats.depth_completed == 0 {
            warn!("search stopped before depth 1 completed; playing the first candidate");
        }
        Ok(self.finish(best_move, best_score, SearchKind::Search, start))
    }

    fn finish(&mut self, best_move: Move, score: i32, kind: SearchKind, start: Instant) -> SearchOutcome {
        let elapsed = start.elapsed();
        self.stats.elapsed = elapsed;
        let secs = elapsed.as_secs_f64();
        self.stats.nps = if secs > 0.0 { (self.stats.nodes as f64 / secs) as u64 } else { 0 };
        info!(
            "{:?}: {} score {} depth {} nodes {} (qs {}) nps {} tt hit {:.1}%",
            kind,
            best_move,
            score,
            self.stats.depth_completed,
            self.stats.nodes,
            self.stats.qs_nodes,
            self.stats.nps,
            self.stats.transposition_hit_rate() * 100.0
        );
        SearchOutcome {
            best_move,
            score,
            kind,
            stats: self.stats.clone(),
        }
    }

    /// Check the clock and the external flag.
    #[inline]
    fn check_time(&mut self) {
        if self.stop.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d) {
            self.stopped = true;
        }
    }

    fn store_killer(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.killers.get_mut(ply) else { return };
        if slot[0].is_some_and(|k| k.same_cells(&mv)) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    /// Credit each stone of a move that caused a cutoff at `depth`.
    fn update_history(&mut self, color: Stone, mv: Move, depth: i8) {
        let bonus = i32::from(depth) * i32::from(depth);
        let table = &mut self.history[color_index(color)];
        for p in mv.stones() {
            let entry = &mut table[p.to_index()];
            *entry = entry.saturating_add(bonus).min(HISTORY_LIMIT);
        }
    }

    /// Halve every entry so older searches fade.
    fn age_history(&mut self) {
        for entry in self.history.iter_mut().flatten() {
            *entry /= 2;
        }
    }

    /// Whether a null move is worth trying here: only away from the root
    /// line, with depth to spare, no opponent threat, and a static score
    /// already at beta.
    fn null_move_applies(
        &self,
        position: &Position,
        depth: i8,
        threats: &[Threat],
        beta: i32,
        allow_null: bool,
    ) -> bool {
        allow_null
            && self.config.enable_null_move
            && depth >= NULL_MOVE_MIN_DEPTH
            && threats.is_empty()
            && beta.abs() < MATE_BOUND
            && self.evaluator.score(position) >= beta
    }

    /// One root iteration. Returns the best fully searched move, or `None`
    /// if the search was stopped before the first one finished.
    fn search_root<T: TranspositionStore>(
        &mut self,
        position: &mut Position,
        tt: &mut T,
        moves: &[Move],
        depth: i8,
        mut alpha: i32,
        beta: i32,
    ) -> Result<Option<(Move, i32)>> {
        let original_alpha = alpha;
        let mut best: Option<(Move, i32)> = None;

        for (i, &mv) in moves.iter().enumerate() {
            let score = {
                let mut child = position.play_scoped(mv);
                if i == 0 {
                    -self.negamax(&mut child, tt, depth - 1, -beta, -alpha, 1, true)?
                } else {
                    let mut s = -self.negamax(&mut child, tt, depth - 1, -alpha - 1, -alpha, 1, true)?;
                    if !self.stopped && s > alpha && s < beta {
                        s = -self.negamax(&mut child, tt, depth - 1, -beta, -alpha, 1, true)?;
                    }
                    s
                }
            };
            if self.stopped {
                break;
            }

            if best.map_or(true, |(_, b)| score > b) {
                best = Some((mv, score));
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        if !self.stopped {
            if let Some((mv, score)) = best {
                let entry_type = if score <= original_alpha {
                    EntryType::UpperBound
                } else if score >= beta {
                    EntryType::LowerBound
                } else {
                    EntryType::Exact
                };
                tt.store(position.hash(), depth, score, entry_type, Some(mv));
            }
        }
        Ok(best)
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax<T: TranspositionStore>(
        &mut self,
        position: &mut Position,
        tt: &mut T,
        depth: i8,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        allow_null: bool,
    ) -> Result<i32> {
        self.stats.nodes += 1;
        if self.stats.nodes & TIME_CHECK_MASK == 0 {
            self.check_time();
        }
        if self.stopped {
            return Ok(0);
        }
        if self.config.verify_hashes {
            position.verify_hash()?;
        }

        let threats = match node_state(position, ply) {
            NodeState::Decided(score) => return Ok(score),
            NodeState::Open(threats) => threats,
        };

        if depth <= 0 || ply >= MAX_PLY - 1 {
            return self.quiescence(position, alpha, beta, ply, QS_MAX_PLIES, &threats);
        }

        // TT probe
        let key = position.hash();
        let original_alpha = alpha;
        self.stats.tt_probes += 1;
        let mut tt_move = None;
        if let Some(entry) = tt.probe(key) {
            self.stats.tt_hits += 1;
            tt_move = entry.best_move;
            let rebased = TTEntry { score: score_from_tt(entry.score, ply), ..entry };
            if let Some(score) = rebased.usable_score(depth, alpha, beta) {
                return Ok(score);
            }
        }

        // Null move: hand the opponent a free turn; if we still clear beta
        // by the margin, the node is not worth expanding.
        if self.null_move_applies(position, depth, &threats, beta, allow_null) {
            self.stats.null_move_tries += 1;
            let r = if depth >= 6 { 3 } else { 2 };
            let null_beta = beta + self.config.null_move_margin;
            let null_score = {
                let mut child = position.pass_scoped();
                -self.negamax(&mut child, tt, depth - 1 - r, -null_beta, -null_beta + 1, ply + 1, false)?
            };
            if self.stopped {
                return Ok(0);
            }
            if null_score >= null_beta {
                return Ok(beta);
            }
        }

        let color = position.side_to_move();
        let hints = OrderingHints {
            tt_move,
            killers: self.killers[ply],
            history: Some(&self.history[color_index(color)]),
            max_moves: self.config.max_candidates,
        };
        let moves = self.generator.candidates(position, &hints);
        if moves.is_empty() {
            return Ok(self.evaluator.score(position));
        }

        let quiet = threats.is_empty();
        let mut best_score = -INF;
        let mut best_move = None;

        for (i, &mv) in moves.iter().enumerate() {
            let reduction = if self.config.enable_lmr && quiet && i >= LMR_MIN_RANK && depth >= LMR_MIN_DEPTH {
                if i >= LMR_DEEP_RANK { 2 } else { 1 }
            } else {
                0
            };

            let score = {
                let mut child = position.play_scoped(mv);
                if i == 0 {
                    -self.negamax(&mut child, tt, depth - 1, -beta, -alpha, ply + 1, true)?
                } else {
                    if reduction > 0 {
                        self.stats.lmr_reductions += 1;
                    }
                    let mut s = -self.negamax(
                        &mut child,
                        tt,
                        depth - 1 - reduction,
                        -alpha - 1,
                        -alpha,
                        ply + 1,
                        true,
                    )?;
                    // Reduced move beat alpha: verify at full depth
                    if !self.stopped && reduction > 0 && s > alpha {
                        self.stats.lmr_researches += 1;
                        s = -self.negamax(&mut child, tt, depth - 1, -alpha - 1, -alpha, ply + 1, true)?;
                    }
                    if !self.stopped && s > alpha && s < beta {
                        s = -self.negamax(&mut child, tt, depth - 1, -beta, -alpha, ply + 1, true)?;
                    }
                    s
                }
            };
            if self.stopped {
                return Ok(0);
            }

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                self.store_killer(ply, mv);
                self.update_history(color, mv, depth);
                break;
            }
        }

        let entry_type = if best_score <= original_alpha {
            EntryType::UpperBound
        } else if best_score >= beta {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        tt.store(key, depth, score_to_tt(best_score, ply), entry_type, best_move);
        Ok(best_score)
    }

    /// Extend a horizon node along forcing moves so it is never scored in
    /// the middle of a threat sequence. A quiet side may stand pat on the
    /// static score; a threatened side must block first. Fail-soft, and
    /// nothing here touches the transposition table.
    fn quiescence(
        &mut self,
        position: &mut Position,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        plies_left: u8,
        threats: &[Threat],
    ) -> Result<i32> {
        let stand_pat = self.evaluator.score(position);
        if plies_left == 0 || ply >= MAX_PLY - 1 {
            return Ok(stand_pat);
        }
        let threatened = !threats.is_empty();
        let mut best_score = -INF;
        if !threatened {
            if stand_pat >= beta {
                return Ok(stand_pat);
            }
            alpha = alpha.max(stand_pat);
            best_score = stand_pat;
        }

        let moves = self.generator.tactical(position, threats, QS_WIDTH);
        if moves.is_empty() {
            return Ok(stand_pat);
        }

        for mv in moves {
            self.stats.nodes += 1;
            self.stats.qs_nodes += 1;
            if self.stats.nodes & TIME_CHECK_MASK == 0 {
                self.check_time();
            }
            if self.stopped {
                return Ok(0);
            }

            let score = {
                let mut child = position.play_scoped(mv);
                if self.config.verify_hashes {
                    child.verify_hash()?;
                }
                match node_state(&child, ply + 1) {
                    NodeState::Decided(score) => -score,
                    NodeState::Open(child_threats) => -self.quiescence(
                        &mut child,
                        -beta,
                        -alpha,
                        ply + 1,
                        plies_left - 1,
                        &child_threats,
                    )?,
                }
            };
            if self.stopped {
                return Ok(0);
            }

            best_score = best_score.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        Ok(best_score)
    }
}
