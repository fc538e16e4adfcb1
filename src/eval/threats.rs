//! Six-cell window analysis
//!
//! Connect6 tactics are exact over windows of six consecutive cells. A
//! window is live for a color when the opponent has no stone in it. With
//! two stones per turn:
//! - a live window holding four or more own stones is a win next turn
//! - the opponent's such windows must all be hit this turn or the game is lost

use once_cell::sync::Lazy;

use crate::board::{Board, Pos, Stone, TOTAL_CELLS, WIN_LENGTH};

use super::patterns::WINDOW_POTENTIAL;
use super::recognizer::Direction;

/// Stones that still need to be placed for a window to become six.
pub const THREAT_STONES: usize = 2;

/// All six-cell windows on the board.
pub static WINDOWS: Lazy<Vec<[Pos; WIN_LENGTH]>> = Lazy::new(build_windows);

/// Indices into [`WINDOWS`] for every cell.
static CELL_WINDOWS: Lazy<Vec<Vec<u16>>> = Lazy::new(|| {
    let mut by_cell = vec![Vec::new(); TOTAL_CELLS];
    for (idx, window) in WINDOWS.iter().enumerate() {
        for pos in window {
            by_cell[pos.to_index()].push(idx as u16);
        }
    }
    by_cell
});

fn build_windows() -> Vec<[Pos; WIN_LENGTH]> {
    let mut windows = Vec::with_capacity(924);
    for dir in Direction::ALL {
        let (dr, dc) = dir.delta();
        for idx in 0..TOTAL_CELLS {
            let start = Pos::from_index(idx);
            if start.offset(dr, dc, WIN_LENGTH as i32 - 1).is_none() {
                continue;
            }
            let mut cells = [start; WIN_LENGTH];
            for (n, cell) in cells.iter_mut().enumerate().skip(1) {
                if let Some(p) = start.offset(dr, dc, n as i32) {
                    *cell = p;
                }
            }
            windows.push(cells);
        }
    }
    windows
}

/// Own and opposing stones in a window.
#[inline]
fn tally(board: &Board, window: &[Pos; WIN_LENGTH], color: Stone) -> (usize, usize) {
    let mut own = 0;
    let mut other = 0;
    for &p in window {
        match board.get(p) {
            Stone::Empty => {}
            s if s == color => own += 1,
            _ => other += 1,
        }
    }
    (own, other)
}

/// Cells that complete a six for `color` with at most `stones` placements.
///
/// The window needing the fewest stones wins; ties go to the first window
/// in scan order. Returned cells are in board order.
pub fn winning_cells(board: &Board, color: Stone, stones: usize) -> Option<Vec<Pos>> {
    if stones == 0 {
        return None;
    }
    let mut best: Option<(usize, &[Pos; WIN_LENGTH])> = None;
    for window in WINDOWS.iter() {
        let (own, other) = tally(board, window, color);
        let missing = WIN_LENGTH - own;
        if other == 0 && missing <= stones && best.map_or(true, |(m, _)| missing < m) {
            best = Some((missing, window));
            if missing <= 1 {
                break;
            }
        }
    }
    best.map(|(_, window)| window.iter().copied().filter(|&p| board.is_empty(p)).collect())
}

/// A live window of the attacker that is at most two stones from six.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    cells: [Pos; THREAT_STONES],
    len: u8,
}

impl Threat {
    /// Empty cells of the window; occupying any one of them defuses it.
    #[inline]
    pub fn cells(&self) -> &[Pos] {
        &self.cells[..self.len as usize]
    }

    #[inline]
    pub fn is_hit_by(&self, pos: Pos) -> bool {
        self.cells().contains(&pos)
    }
}

/// Every window the defender must hit this turn to survive.
pub fn threat_windows(board: &Board, attacker: Stone) -> Vec<Threat> {
    let mut threats = Vec::new();
    for window in WINDOWS.iter() {
        let (own, other) = tally(board, window, attacker);
        if other != 0 || own + THREAT_STONES < WIN_LENGTH || own == WIN_LENGTH {
            continue;
        }
        let mut threat = Threat { cells: [window[0]; THREAT_STONES], len: 0 };
        for &p in window {
            if board.is_empty(p) {
                threat.cells[threat.len as usize] = p;
                threat.len += 1;
            }
        }
        if !threats.contains(&threat) {
            threats.push(threat);
        }
    }
    threats
}

/// Distinct cells appearing in any threat, in board order.
pub fn blocking_cells(threats: &[Threat]) -> Vec<Pos> {
    let mut cells: Vec<Pos> = threats.iter().flat_map(|t| t.cells().iter().copied()).collect();
    cells.sort_unstable();
    cells.dedup();
    cells
}

/// Whether stones at `a` and `b` defuse every threat.
pub fn blocks_all(threats: &[Threat], a: Pos, b: Option<Pos>) -> bool {
    threats
        .iter()
        .all(|t| t.is_hit_by(a) || b.is_some_and(|b| t.is_hit_by(b)))
}

/// Fewest stones that defuse every threat, capped at 3 (meaning "more than two").
pub fn blockers_needed(threats: &[Threat]) -> usize {
    if threats.is_empty() {
        return 0;
    }
    let cells = blocking_cells(threats);
    if cells.iter().any(|&a| blocks_all(threats, a, None)) {
        return 1;
    }
    for (i, &a) in cells.iter().enumerate() {
        if cells[i + 1..].iter().any(|&b| blocks_all(threats, a, Some(b))) {
            return 2;
        }
    }
    3
}

/// Cells that would turn a live window of `color` into a threat, most
/// windows first, then board order.
pub fn threat_making_cells(board: &Board, color: Stone) -> Vec<Pos> {
    let mut counts = [0u8; TOTAL_CELLS];
    for window in WINDOWS.iter() {
        if tally(board, window, color) != (WIN_LENGTH - THREAT_STONES - 1, 0) {
            continue;
        }
        for &p in window {
            if board.is_empty(p) {
                counts[p.to_index()] = counts[p.to_index()].saturating_add(1);
            }
        }
    }
    let mut cells: Vec<(u8, usize)> = counts
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > 0)
        .map(|(idx, &n)| (n, idx))
        .collect();
    cells.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    cells.into_iter().map(|(_, idx)| Pos::from_index(idx)).collect()
}

/// Sum of live-window potential for `color`.
pub fn window_potential(board: &Board, color: Stone) -> i32 {
    WINDOWS
        .iter()
        .map(|w| match tally(board, w, color) {
            (own, 0) => WINDOW_POTENTIAL[own],
            _ => 0,
        })
        .sum()
}

/// Change in `window_potential(color) - window_potential(opponent)` if
/// `color` placed stones on `cells`. Only windows touching `cells` are visited.
pub fn potential_delta(board: &Board, cells: &[Pos], color: Stone) -> i32 {
    let mut touched: Vec<u16> = cells
        .iter()
        .flat_map(|p| CELL_WINDOWS[p.to_index()].iter().copied())
        .collect();
    touched.sort_unstable();
    touched.dedup();

    let mut delta = 0;
    for idx in touched {
        let window = &WINDOWS[idx as usize];
        let (own, other) = tally(board, window, color);
        let added = window.iter().filter(|p| cells.contains(p)).count();
        let before = signed_potential(own, other);
        let after = signed_potential(own + added, other);
        delta += after - before;
    }
    delta
}

fn signed_potential(own: usize, other: usize) -> i32 {
    match (own, other) {
        (own, 0) => WINDOW_POTENTIAL[own.min(WIN_LENGTH)],
        (0, other) => -WINDOW_POTENTIAL[other.min(WIN_LENGTH)],
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(board: &mut Board, r: u8, cols: &[u8], color: Stone) {
        for &c in cols {
            board.place_stone(Pos::new(r, c), color);
        }
    }

    #[test]
    fn test_window_count() {
        // 19 * 14 per straight direction, 14 * 14 per diagonal
        assert_eq!(WINDOWS.len(), 2 * 19 * 14 + 2 * 14 * 14);
    }

    #[test]
    fn test_winning_cells_prefers_fewest_stones() {
        let mut board = Board::new();
        board.place_stone(Pos::new(9, 3), Stone::White);
        row(&mut board, 9, &[4, 5, 6, 7, 8], Stone::Black);
        let cells = winning_cells(&board, Stone::Black, 2).unwrap();
        assert_eq!(cells, vec![Pos::new(9, 9)]);
    }

    #[test]
    fn test_winning_cells_two_stone_gap() {
        let mut board = Board::new();
        row(&mut board, 0, &[0, 1, 3, 5], Stone::White);
        assert_eq!(
            winning_cells(&board, Stone::White, 2),
            Some(vec![Pos::new(0, 2), Pos::new(0, 4)])
        );
        assert_eq!(winning_cells(&board, Stone::White, 1), None);
    }

    #[test]
    fn test_no_win_through_opponent_stone() {
        let mut board = Board::new();
        row(&mut board, 5, &[2, 3, 5, 6], Stone::Black);
        board.place_stone(Pos::new(5, 4), Stone::White);
        assert_eq!(winning_cells(&board, Stone::Black, 2), None);
    }

    #[test]
    fn test_open_four_needs_two_blockers() {
        let mut board = Board::new();
        row(&mut board, 9, &[7, 8, 9, 10], Stone::White);
        let threats = threat_windows(&board, Stone::White);
        assert_eq!(threats.len(), 3);
        assert_eq!(blockers_needed(&threats), 2);
        assert!(blocks_all(&threats, Pos::new(9, 6), Some(Pos::new(9, 11))));
        assert!(!blocks_all(&threats, Pos::new(9, 5), Some(Pos::new(9, 12))));
    }

    #[test]
    fn test_closed_five_needs_one_blocker() {
        let mut board = Board::new();
        board.place_stone(Pos::new(9, 3), Stone::Black);
        row(&mut board, 9, &[4, 5, 6, 7, 8], Stone::White);
        let threats = threat_windows(&board, Stone::White);
        assert_eq!(blockers_needed(&threats), 1);
        assert_eq!(blocking_cells(&threats)[0], Pos::new(9, 9));
    }

    #[test]
    fn test_three_separate_fours_are_unblockable() {
        let mut board = Board::new();
        row(&mut board, 1, &[1, 2, 3, 4], Stone::White);
        row(&mut board, 8, &[1, 2, 3, 4], Stone::White);
        row(&mut board, 15, &[1, 2, 3, 4], Stone::White);
        let threats = threat_windows(&board, Stone::White);
        assert_eq!(blockers_needed(&threats), 3);
    }

    #[test]
    fn test_threat_making_cells_around_three() {
        let mut board = Board::new();
        row(&mut board, 9, &[8, 9, 10], Stone::Black);
        let cells = threat_making_cells(&board, Stone::Black);
        assert_eq!(cells.len(), 6);
        assert_eq!(&cells[..2], &[Pos::new(9, 7), Pos::new(9, 11)]);
        assert!(cells.iter().all(|p| p.row == 9 && (5..=13).contains(&p.col)));

        // A blocked end removes the windows through it
        board.place_stone(Pos::new(9, 11), Stone::White);
        let cells = threat_making_cells(&board, Stone::Black);
        assert_eq!(cells, vec![Pos::new(9, 5), Pos::new(9, 6), Pos::new(9, 7)]);
        assert!(threat_making_cells(&board, Stone::White).is_empty());
    }

    #[test]
    fn test_potential_symmetry() {
        let mut board = Board::new();
        row(&mut board, 9, &[8, 9], Stone::Black);
        row(&mut board, 10, &[8], Stone::White);
        let swapped = board.color_swapped();
        assert_eq!(
            window_potential(&board, Stone::Black) - window_potential(&board, Stone::White),
            window_potential(&swapped, Stone::White) - window_potential(&swapped, Stone::Black)
        );
    }

    #[test]
    fn test_potential_delta_matches_full_recount() {
        let mut board = Board::new();
        row(&mut board, 9, &[8, 9], Stone::Black);
        row(&mut board, 10, &[8, 10], Stone::White);
        let cells = [Pos::new(9, 10), Pos::new(8, 9)];

        let before = window_potential(&board, Stone::Black) - window_potential(&board, Stone::White);
        let delta = potential_delta(&board, &cells, Stone::Black);
        for &p in &cells {
            board.place_stone(p, Stone::Black);
        }
        let after = window_potential(&board, Stone::Black) - window_potential(&board, Stone::White);
        assert_eq!(after - before, delta);
    }
}
