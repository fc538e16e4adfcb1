//! Win condition: six or more stones in a row

use crate::board::{Board, Move, Pos, Stone, WIN_LENGTH};

/// Direction vectors for line checking (4 directions)
pub const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Length of the `color` run through `pos` along `(dr, dc)`, counting `pos`.
#[inline]
pub fn run_length(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> usize {
    let mut count = 1;
    for sign in [1, -1] {
        let mut n = 1;
        while let Some(next) = pos.offset(dr * sign, dc * sign, n) {
            if board.get(next) != color {
                break;
            }
            count += 1;
            n += 1;
        }
    }
    count
}

/// Six-or-more check through a single stone. No allocation.
#[inline]
pub fn has_six_at(board: &Board, pos: Pos, color: Stone) -> bool {
    board.get(pos) == color
        && DIRECTIONS
            .iter()
            .any(|&(dr, dc)| run_length(board, pos, color, dr, dc) >= WIN_LENGTH)
}

/// Whether `mv`, already on the board for `color`, completed a six.
pub fn move_wins(board: &Board, mv: &Move, color: Stone) -> bool {
    mv.stones().any(|pos| has_six_at(board, pos, color))
}

/// Cells of a winning line for `color`, if one exists.
pub fn find_six(board: &Board, color: Stone) -> Option<Vec<Pos>> {
    let stones = board.stones(color)?;
    for pos in stones.iter_ones() {
        for &(dr, dc) in &DIRECTIONS {
            // Only start from the first stone of a run
            if pos.offset(-dr, -dc, 1).is_some_and(|p| board.get(p) == color) {
                continue;
            }
            let line: Vec<Pos> = (0..)
                .map_while(|n| pos.offset(dr, dc, n).filter(|&p| board.get(p) == color))
                .collect();
            if line.len() >= WIN_LENGTH {
                return Some(line);
            }
        }
    }
    None
}

/// Full-board winner scan.
pub fn check_winner(board: &Board) -> Option<Stone> {
    [Stone::Black, Stone::White]
        .into_iter()
        .find(|&color| find_six(board, color).is_some())
}
