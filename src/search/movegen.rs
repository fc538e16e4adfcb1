//! Move generation and ordering
//!
//! A Connect6 turn is a pair of cells, so the raw branching factor is in
//! the tens of thousands. Generation works in two stages:
//! 1. rank single cells near existing stones by tactical value
//! 2. pair the best cells and rank pairs by combined value plus a local
//!    evaluation delta
//!
//! Tactics short-circuit both stages: an immediate win is the only
//! candidate, and when the opponent threatens to win next turn only pairs
//! that hit every threat window are generated.
//!
//! [`MoveGenerator::tactical`] is the narrow generator used past the
//! search horizon: moves that create a threat, or cheap full blocks when
//! already threatened.

use std::collections::HashSet;

use crate::board::{Board, Move, Pos, Position, Stone, BOARD_SIZE, CENTER, TOTAL_CELLS};
use crate::eval::heuristic::{Evaluator, PatternEvaluator};
use crate::eval::recognizer::{shape_if_placed, Shape};
use crate::eval::threats::{
    blockers_needed, blocking_cells, blocks_all, threat_making_cells, threat_windows, winning_cells, Threat,
};

/// Default cap on generated moves
pub const DEFAULT_MAX_MOVES: usize = 30;

/// Neighborhood (Chebyshev) around existing stones considered for play
const RADIUS: i32 = 2;

/// Cells paired with each other in quiet positions
const CELL_POOL: usize = 12;

/// Ordering bonus for killer moves
const KILLER_BONUS: i32 = 25_000;

/// History never outranks a killer
pub const HISTORY_BONUS_CAP: i32 = 20_000;

/// Threat-making cells paired by [`threat_moves`]
const TACTICAL_POOL: usize = 5;

/// Ordering inputs supplied by the search.
#[derive(Debug, Clone, Copy)]
pub struct OrderingHints<'a> {
    /// Best move from a transposition hit; always searched first when legal
    pub tt_move: Option<Move>,
    pub killers: [Option<Move>; 2],
    /// Per-cell cutoff history for the side to move
    pub history: Option<&'a [i32; TOTAL_CELLS]>,
    pub max_moves: usize,
}

impl Default for OrderingHints<'_> {
    fn default() -> Self {
        Self {
            tt_move: None,
            killers: [None; 2],
            history: None,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

impl OrderingHints<'_> {
    /// Ordering bonus from killers and history.
    fn bonus(&self, mv: &Move) -> i32 {
        let mut bonus = 0;
        if self.killers.iter().flatten().any(|k| k.same_cells(mv)) {
            bonus += KILLER_BONUS;
        }
        if let Some(table) = self.history {
            let sum: i32 = mv.stones().map(|p| table[p.to_index()]).sum();
            bonus += sum.min(HISTORY_BONUS_CAP);
        }
        bonus
    }
}

/// Candidate generation capability used by the search.
pub trait MoveGenerator {
    /// Ordered candidate moves for the side to move, at most `hints.max_moves`.
    /// Empty only when no stone can be placed.
    fn candidates(&self, position: &Position, hints: &OrderingHints) -> Vec<Move>;

    /// Forcing moves only, at most `max_moves`: full blocks when `threats`
    /// (the opponent's) is non-empty, otherwise moves that make a threat.
    fn tactical(&self, position: &Position, threats: &[Threat], max_moves: usize) -> Vec<Move> {
        let stones = position.stones_this_turn();
        if threats.is_empty() {
            threat_moves(position.board(), position.side_to_move(), stones, max_moves)
        } else {
            blocking_moves(position.board(), threats, stones, max_moves)
        }
    }
}

/// A cell with its ordering score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCell {
    pub pos: Pos,
    pub score: i32,
}

/// Proximity-based generator with pattern-driven ordering.
#[derive(Debug, Clone, Default)]
pub struct ProximityGenerator<E = PatternEvaluator> {
    evaluator: E,
}

impl<E: Evaluator> ProximityGenerator<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    fn pair_score(&self, board: &Board, a: &RankedCell, b: &RankedCell, color: Stone) -> i32 {
        a.score + b.score + self.evaluator.placement_delta(board, &[a.pos, b.pos], color)
    }

    /// Pairs drawn from the top of the ranking.
    fn quiet_pairs(&self, board: &Board, ranked: &[RankedCell], color: Stone) -> Vec<(Move, i32)> {
        let pool = &ranked[..ranked.len().min(CELL_POOL)];
        let mut pairs = Vec::with_capacity(pool.len() * pool.len() / 2);
        for (i, a) in pool.iter().enumerate() {
            for b in &pool[i + 1..] {
                pairs.push((Move::pair(a.pos, b.pos), self.pair_score(board, a, b, color)));
            }
        }
        pairs
    }

    /// Pairs that defuse every threat window, or as many as possible when
    /// that cannot be done.
    fn defensive_pairs(
        &self,
        board: &Board,
        ranked: &[RankedCell],
        threats: &[Threat],
        color: Stone,
    ) -> Vec<(Move, i32)> {
        let blockers: Vec<RankedCell> = blocking_cells(threats)
            .into_iter()
            .map(|pos| ranked_or_scored(ranked, board, pos, color))
            .collect();
        let partners: Vec<RankedCell> = blockers
            .iter()
            .copied()
            .chain(ranked.iter().take(CELL_POOL).copied())
            .collect();

        let mut seen: HashSet<(Pos, Pos)> = HashSet::new();
        let mut full = Vec::new();
        let mut partial: Vec<(Move, i32, usize)> = Vec::new();
        for a in &blockers {
            for b in &partners {
                if a.pos == b.pos || !seen.insert((a.pos.min(b.pos), a.pos.max(b.pos))) {
                    continue;
                }
                let (first, second) = if b.score > a.score { (b, a) } else { (a, b) };
                let mv = Move::pair(first.pos, second.pos);
                let score = self.pair_score(board, first, second, color);
                if blocks_all(threats, a.pos, Some(b.pos)) {
                    full.push((mv, score));
                } else {
                    let hit = threats
                        .iter()
                        .filter(|t| t.is_hit_by(a.pos) || t.is_hit_by(b.pos))
                        .count();
                    partial.push((mv, score, hit));
                }
            }
        }
        if !full.is_empty() {
            return full;
        }
        let most = partial.iter().map(|&(_, _, hit)| hit).max().unwrap_or(0);
        partial
            .into_iter()
            .filter(|&(_, _, hit)| hit == most)
            .map(|(mv, score, _)| (mv, score))
            .collect()
    }
}

impl<E: Evaluator> MoveGenerator for ProximityGenerator<E> {
    fn candidates(&self, position: &Position, hints: &OrderingHints) -> Vec<Move> {
        let board = position.board();
        let stones = position.stones_this_turn();
        let color = position.side_to_move();
        if stones == 0 || hints.max_moves == 0 {
            return Vec::new();
        }

        let ranked = rank_cells(board, color);

        if let Some(cells) = winning_cells(board, color, stones) {
            return complete_move(board, &cells, &ranked, stones).into_iter().collect();
        }

        let threats = threat_windows(board, color.opponent());

        let mut scored: Vec<(Move, i32)> = if stones == 1 {
            let needed = blockers_needed(&threats);
            ranked
                .iter()
                .filter(|c| needed != 1 || blocks_all(&threats, c.pos, None))
                .map(|c| (Move::single(c.pos), c.score))
                .collect()
        } else if threats.is_empty() {
            self.quiet_pairs(board, &ranked, color)
        } else {
            self.defensive_pairs(board, &ranked, &threats, color)
        };

        for (mv, score) in &mut scored {
            *score += hints.bonus(mv);
        }
        scored.sort_by(|(ma, sa), (mb, sb)| {
            sb.cmp(sa).then_with(|| move_key(ma).cmp(&move_key(mb)))
        });

        let mut moves: Vec<Move> = Vec::with_capacity(hints.max_moves);
        if let Some(tt_move) = hints.tt_move {
            if position.check_move(&tt_move).is_ok() {
                moves.push(tt_move);
            }
        }
        for (mv, _) in scored {
            if moves.len() >= hints.max_moves {
                break;
            }
            if !moves.iter().any(|m| m.same_cells(&mv)) {
                moves.push(mv);
            }
        }
        moves
    }
}

fn move_key(mv: &Move) -> (usize, usize) {
    (mv.first().to_index(), mv.second().map_or(usize::MAX, Pos::to_index))
}

fn ranked_or_scored(ranked: &[RankedCell], board: &Board, pos: Pos, color: Stone) -> RankedCell {
    ranked
        .iter()
        .find(|c| c.pos == pos)
        .copied()
        .unwrap_or_else(|| RankedCell { pos, score: cell_score(board, pos, color) })
}

/// Turn winning cells into a full move, topping up with the best other
/// cells and then any empty cell. `None` only when nothing can be placed.
pub fn complete_move(board: &Board, cells: &[Pos], ranked: &[RankedCell], stones: usize) -> Option<Move> {
    let mut chosen: Vec<Pos> = cells.iter().copied().take(stones).collect();
    let fill = ranked.iter().map(|c| c.pos).chain(board.empty_cells());
    for pos in fill {
        if chosen.len() >= stones {
            break;
        }
        if board.is_empty(pos) && !chosen.contains(&pos) {
            chosen.push(pos);
        }
    }
    match chosen.as_slice() {
        [a, b, ..] => Some(Move::pair(*a, *b)),
        [a] => Some(Move::single(*a)),
        [] => None,
    }
}

/// Up to `limit` moves that raise a live window of `color` to a threat,
/// built from the cells that do so for the most windows.
pub fn threat_moves(board: &Board, color: Stone, stones: usize, limit: usize) -> Vec<Move> {
    let pool: Vec<Pos> = threat_making_cells(board, color).into_iter().take(TACTICAL_POOL).collect();
    let mut moves = Vec::new();
    match (stones, pool.as_slice()) {
        (0, _) | (_, []) => {}
        (1, _) => moves.extend(pool.iter().map(|&p| Move::single(p))),
        (_, [only]) => moves.extend(nearest_other(board, *only).map(|p| Move::pair(*only, p))),
        _ => {
            for (i, &a) in pool.iter().enumerate() {
                moves.extend(pool[i + 1..].iter().map(|&b| Move::pair(a, b)));
            }
        }
    }
    moves.truncate(limit);
    moves
}

/// Up to `limit` moves that hit every window in `threats`, unranked.
pub fn blocking_moves(board: &Board, threats: &[Threat], stones: usize, limit: usize) -> Vec<Move> {
    let cells = blocking_cells(threats);
    let mut moves = Vec::new();
    match (stones, cells.as_slice()) {
        (0, _) | (_, []) => {}
        (1, _) => moves.extend(
            cells
                .iter()
                .filter(|&&a| blocks_all(threats, a, None))
                .map(|&a| Move::single(a)),
        ),
        (_, [only]) => moves.extend(nearest_other(board, *only).map(|p| Move::pair(*only, p))),
        _ => {
            for (i, &a) in cells.iter().enumerate() {
                for &b in &cells[i + 1..] {
                    if blocks_all(threats, a, Some(b)) {
                        moves.push(Move::pair(a, b));
                    }
                }
            }
        }
    }
    moves.truncate(limit);
    moves
}

/// Closest empty cell other than `pos` (Chebyshev distance, then board order).
fn nearest_other(board: &Board, pos: Pos) -> Option<Pos> {
    board
        .empty_cells()
        .filter(|&p| p != pos)
        .min_by_key(|p| (p.row.abs_diff(pos.row).max(p.col.abs_diff(pos.col)), *p))
}

// =============================================================================
// Cell ranking
// =============================================================================

/// Empty cells near existing stones, best first.
///
/// On an empty board the center and its ring are returned so that a
/// turn can always be filled.
pub fn rank_cells(board: &Board, color: Stone) -> Vec<RankedCell> {
    let mut near = [false; TOTAL_CELLS];
    let mut any = false;
    for stone in board.occupied().iter_ones() {
        any = true;
        for dr in -RADIUS..=RADIUS {
            for dc in -RADIUS..=RADIUS {
                if let Some(p) = Pos::try_new(i32::from(stone.row) + dr, i32::from(stone.col) + dc) {
                    near[p.to_index()] = true;
                }
            }
        }
    }
    if !any {
        for dr in -1..=1 {
            for dc in -1..=1 {
                if let Some(p) = CENTER.offset(dr, dc, 1) {
                    near[p.to_index()] = true;
                }
            }
        }
        near[CENTER.to_index()] = true;
    }

    let mut cells: Vec<RankedCell> = (0..TOTAL_CELLS)
        .filter(|&i| near[i])
        .map(Pos::from_index)
        .filter(|&p| board.is_empty(p))
        .map(|pos| RankedCell { pos, score: cell_score(board, pos, color) })
        .collect();

    // Fall back to every empty cell when the neighborhood is full
    if cells.is_empty() {
        cells = board
            .empty_cells()
            .map(|pos| RankedCell { pos, score: cell_score(board, pos, color) })
            .collect();
    }

    cells.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.pos.center_distance().cmp(&b.pos.center_distance()))
            .then_with(|| a.pos.cmp(&b.pos))
    });
    cells
}

/// Tactical value of placing `color` at `pos`: the shape it makes, the
/// opponent shape it spoils, contact with stones and closeness to center.
pub fn cell_score(board: &Board, pos: Pos, color: Stone) -> i32 {
    let attack = shape_if_placed(board, pos, color);
    let defense = shape_if_placed(board, pos, color.opponent());

    let attack_value = match attack {
        Shape::Six => 2_000_000,
        s => s.weight(),
    };
    // Blocking ranks just under making the same shape ourselves
    let defense_value = match defense {
        Shape::Six => 1_500_000,
        s => s.weight() * 9 / 10,
    };

    let mut contact = 0;
    for dr in -1..=1 {
        for dc in -1..=1 {
            if (dr, dc) == (0, 0) {
                continue;
            }
            if let Some(p) = pos.offset(dr, dc, 1) {
                if !board.is_empty(p) {
                    contact += 1;
                }
            }
        }
    }

    let center = (BOARD_SIZE as i32 / 2 - i32::from(pos.center_distance())) * 2;
    attack_value + defense_value + contact * 10 + center
}
