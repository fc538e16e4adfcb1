//! Heuristic evaluation of Connect6 positions
//!
//! The score combines:
//! - line shapes from the recognizer, with combination bonuses
//! - live six-cell window potential
//! - center control
//!
//! Everything is computed per color and subtracted, so the evaluation is
//! exactly antisymmetric: `evaluate(board, A) == -evaluate(board, B)`.

use crate::board::{Board, Pos, Position, Stone, BOARD_SIZE};

use super::patterns::PatternScore;
use super::recognizer::{shape_counts, Shape};
use super::threats::{potential_delta, window_potential};

/// Largest Chebyshev distance from the center on a 19x19 board
const MAX_CENTER_DIST: i32 = (BOARD_SIZE as i32 - 1) / 2;

/// Weight per step closer to the center
const POSITION_WEIGHT: i32 = 3;

/// Static evaluation capability used by the search.
pub trait Evaluator {
    /// Score from `color`'s point of view.
    fn evaluate(&self, board: &Board, color: Stone) -> i32;

    /// Score for the side to move.
    fn score(&self, position: &Position) -> i32 {
        self.evaluate(position.board(), position.side_to_move())
    }

    /// Estimated change of `evaluate(board, color)` if `color` placed `cells`.
    fn placement_delta(&self, board: &Board, cells: &[Pos], color: Stone) -> i32 {
        let mut after = board.clone();
        for &p in cells {
            after.place_stone(p, color);
        }
        self.evaluate(&after, color) - self.evaluate(board, color)
    }
}

/// Pattern + window + center evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEvaluator;

impl PatternEvaluator {
    fn side_value(board: &Board, color: Stone) -> (i32, bool) {
        let counts = shape_counts(board, color);
        if counts.get(Shape::Six) > 0 {
            return (0, true);
        }
        let value = counts.value() + window_potential(board, color) + position_value(board, color);
        (value, false)
    }
}

impl Evaluator for PatternEvaluator {
    fn evaluate(&self, board: &Board, color: Stone) -> i32 {
        let opponent = color.opponent();
        let (mine, i_won) = Self::side_value(board, color);
        let (theirs, they_won) = Self::side_value(board, opponent);
        match (i_won, they_won) {
            (true, false) => PatternScore::WIN,
            (false, true) => -PatternScore::WIN,
            _ => (mine - theirs).clamp(-PatternScore::EVAL_LIMIT, PatternScore::EVAL_LIMIT),
        }
    }

    /// Local estimate: window potential and center terms only.
    fn placement_delta(&self, board: &Board, cells: &[Pos], color: Stone) -> i32 {
        let center: i32 = cells.iter().map(|&p| center_bonus(p)).sum();
        potential_delta(board, cells, color) + center
    }
}

#[inline]
fn center_bonus(pos: Pos) -> i32 {
    (MAX_CENTER_DIST - i32::from(pos.center_distance())) * POSITION_WEIGHT
}

fn position_value(board: &Board, color: Stone) -> i32 {
    board
        .stones(color)
        .map_or(0, |stones| stones.iter_ones().map(center_bonus).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::patterns::ScoreBand;

    fn place(board: &mut Board, cells: &[(u8, u8)], color: Stone) {
        for &(r, c) in cells {
            board.place_stone(Pos::new(r, c), color);
        }
    }

    #[test]
    fn test_empty_board_is_zero() {
        let board = Board::new();
        assert_eq!(PatternEvaluator.evaluate(&board, Stone::Black), 0);
    }

    #[test]
    fn test_negamax_symmetry() {
        let mut board = Board::new();
        place(&mut board, &[(9, 9), (9, 10), (10, 10)], Stone::Black);
        place(&mut board, &[(8, 8), (8, 9), (11, 11)], Stone::White);
        let e = PatternEvaluator;
        assert_eq!(e.evaluate(&board, Stone::Black), -e.evaluate(&board, Stone::White));
    }

    #[test]
    fn test_color_swapped_mirror_negates() {
        let mut black = Vec::new();
        let mut white = Vec::new();
        for c in 6..10 {
            black.push(Pos::new(9, c));
        }
        white.extend([Pos::new(8, 8), Pos::new(10, 10), Pos::new(3, 3)]);
        let position = Position::from_stones(&black, &white, Stone::White).unwrap();
        let mirror = position.color_swapped();
        let e = PatternEvaluator;
        assert_eq!(e.score(&mirror), -e.score(&position));
    }

    #[test]
    fn test_open_four_is_critical() {
        let mut board = Board::new();
        place(&mut board, &[(9, 7), (9, 8), (9, 9), (9, 10)], Stone::White);
        let score = PatternEvaluator.evaluate(&board, Stone::White);
        assert_eq!(ScoreBand::of(score), ScoreBand::Critical);
        assert!(PatternEvaluator.evaluate(&board, Stone::Black) < 0);
    }

    #[test]
    fn test_open_three_is_advantage() {
        let mut board = Board::new();
        place(&mut board, &[(9, 8), (9, 9), (9, 10)], Stone::Black);
        let score = PatternEvaluator.evaluate(&board, Stone::Black);
        assert_eq!(ScoreBand::of(score), ScoreBand::Advantage);
    }

    #[test]
    fn test_six_on_board_is_decisive() {
        let mut board = Board::new();
        place(&mut board, &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)], Stone::Black);
        assert_eq!(PatternEvaluator.evaluate(&board, Stone::Black), PatternScore::WIN);
        assert_eq!(PatternEvaluator.evaluate(&board, Stone::White), -PatternScore::WIN);
    }

    #[test]
    fn test_center_preferred() {
        let mut center = Board::new();
        center.place_stone(Pos::new(9, 9), Stone::Black);
        let mut corner = Board::new();
        corner.place_stone(Pos::new(0, 0), Stone::Black);
        let e = PatternEvaluator;
        assert!(e.evaluate(&center, Stone::Black) > e.evaluate(&corner, Stone::Black));
    }

    #[test]
    fn test_placement_delta_rewards_extension() {
        let mut board = Board::new();
        place(&mut board, &[(9, 8), (9, 9)], Stone::Black);
        let e = PatternEvaluator;
        let extend = e.placement_delta(&board, &[Pos::new(9, 10), Pos::new(9, 11)], Stone::Black);
        let scatter = e.placement_delta(&board, &[Pos::new(2, 2), Pos::new(16, 16)], Stone::Black);
        assert!(extend > scatter);
    }
}
