//! Pattern recognition over lines of stones
//!
//! A line segment is a run of one color along one of the four directions,
//! optionally broken by a single empty cell. Each segment is classified by
//! stone count, openness at both ends and the room left to grow into six.
//! Segments that cannot reach six (hemmed in by the opponent or the edge)
//! are reported as [`Shape::Dead`].
//!
//! # Example
//!
//! ```
//! use connect6::board::{Board, Pos, Stone};
//! use connect6::eval::recognizer::{classify, Shape};
//!
//! let mut board = Board::new();
//! for col in 7..11 {
//!     board.place_stone(Pos::new(9, col), Stone::White);
//! }
//! let patterns = classify(&board);
//! assert_eq!(patterns[0].shape, Shape::OpenFour);
//! assert_eq!(patterns[0].owner, Stone::White);
//! ```

use crate::board::{Board, Pos, Stone, WIN_LENGTH};

use super::patterns::PatternScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Horizontal,
    Vertical,
    Diagonal,
    AntiDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::Diagonal,
        Direction::AntiDiagonal,
    ];

    /// (row, col) step
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::Diagonal => (1, 1),
            Direction::AntiDiagonal => (1, -1),
        }
    }
}

/// Whether a segment can extend past its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Openness {
    Blocked,
    OneEnd,
    BothEnds,
}

/// Tactical shape, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shape {
    /// Cannot grow into six
    Dead,
    ClosedTwo,
    OpenTwo,
    ClosedThree,
    OpenThree,
    DoubleThree,
    ClosedFour,
    FourThree,
    DoubleFour,
    OpenFour,
    /// Five stones, one empty cell completes six
    Five,
    Six,
}

impl Shape {
    /// Evaluation weight. Combination shapes are bonuses on top of their lines.
    #[must_use]
    pub fn weight(self) -> i32 {
        match self {
            Shape::Dead => 0,
            Shape::ClosedTwo => PatternScore::CLOSED_TWO,
            Shape::OpenTwo => PatternScore::OPEN_TWO,
            Shape::ClosedThree => PatternScore::CLOSED_THREE,
            Shape::OpenThree => PatternScore::OPEN_THREE,
            Shape::DoubleThree => PatternScore::DOUBLE_THREE,
            Shape::ClosedFour => PatternScore::CLOSED_FOUR,
            Shape::FourThree => PatternScore::FOUR_THREE,
            Shape::DoubleFour => PatternScore::DOUBLE_FOUR,
            Shape::OpenFour => PatternScore::OPEN_FOUR,
            Shape::Five => PatternScore::FIVE,
            Shape::Six => PatternScore::WIN,
        }
    }

    /// Needs an answer from the opponent soon.
    #[inline]
    pub fn is_threat(self) -> bool {
        self >= Shape::OpenThree
    }

    #[inline]
    pub fn is_combination(self) -> bool {
        matches!(self, Shape::DoubleThree | Shape::FourThree | Shape::DoubleFour)
    }

    #[inline]
    fn is_four(self) -> bool {
        matches!(self, Shape::ClosedFour | Shape::OpenFour)
    }
}

/// One classified line, or a combination of lines, owned by one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub owner: Stone,
    pub shape: Shape,
    pub direction: Direction,
    /// Stones in the segment (for combinations: in the strongest line)
    pub stones: u8,
    pub openness: Openness,
    /// First stone of the segment; ranking and tie-breaks use this point
    pub anchor: Pos,
    /// Empty cells that extend the line: open ends and the inner gap
    pub completions: Vec<Pos>,
}

impl Pattern {
    /// Sort key: severity first, then closeness to center, then coordinate.
    fn rank_key(&self) -> (std::cmp::Reverse<Shape>, u8, usize) {
        (std::cmp::Reverse(self.shape), self.anchor.center_distance(), self.anchor.to_index())
    }
}

/// Sort patterns most severe first with deterministic tie-breaks.
pub fn rank_patterns(patterns: &mut [Pattern]) {
    patterns.sort_by_key(Pattern::rank_key);
}

// =============================================================================
// Segment scanning
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Own,
    Other,
    Empty,
    Edge,
}

/// Raw segment measured in offsets from its first stone.
#[derive(Debug, Clone, Copy)]
struct Segment {
    stones: u8,
    longest_run: u8,
    last: i32,
    gap: Option<i32>,
    open_before: bool,
    open_after: bool,
    room: u8,
}

impl Segment {
    fn openness(&self) -> Openness {
        match (self.open_before, self.open_after) {
            (true, true) => Openness::BothEnds,
            (false, false) => Openness::Blocked,
            _ => Openness::OneEnd,
        }
    }

    fn shape(&self) -> Shape {
        if self.longest_run as usize >= WIN_LENGTH {
            return Shape::Six;
        }
        if (self.room as usize) < WIN_LENGTH {
            return Shape::Dead;
        }
        let open = self.openness();
        let gapped = self.gap.is_some();
        match self.stones {
            s if s >= 5 => {
                if gapped || open != Openness::Blocked {
                    Shape::Five
                } else {
                    Shape::Dead
                }
            }
            4 if open == Openness::BothEnds => Shape::OpenFour,
            4 => Shape::ClosedFour,
            3 if open == Openness::BothEnds => Shape::OpenThree,
            3 => Shape::ClosedThree,
            2 if open == Openness::BothEnds => Shape::OpenTwo,
            2 => Shape::ClosedTwo,
            _ => Shape::Dead,
        }
    }

    fn covers(&self, offset: i32) -> bool {
        (0..=self.last).contains(&offset) && self.gap != Some(offset)
    }
}

/// Scan a segment whose first stone sits at offset 0 (`at(-1)` is not own).
fn scan_segment(at: &impl Fn(i32) -> Cell) -> Segment {
    let mut stones = 1u8;
    let mut run = 1u8;
    let mut longest_run = 1u8;
    let mut last = 0;
    let mut gap = None;

    let mut i = 1;
    loop {
        match at(i) {
            Cell::Own => {
                stones += 1;
                run += 1;
                longest_run = longest_run.max(run);
                last = i;
            }
            Cell::Empty if gap.is_none() && at(i + 1) == Cell::Own => {
                gap = Some(i);
                run = 0;
            }
            _ => break,
        }
        i += 1;
    }

    let room_before = (1..=WIN_LENGTH as i32)
        .take_while(|&k| matches!(at(-k), Cell::Empty | Cell::Own))
        .count();
    let room_after = (1..=WIN_LENGTH as i32)
        .take_while(|&k| matches!(at(last + k), Cell::Empty | Cell::Own))
        .count();
    let room = (room_before + last as usize + 1 + room_after).min(u8::MAX as usize) as u8;

    Segment {
        stones,
        longest_run,
        last,
        gap,
        open_before: at(-1) == Cell::Empty,
        open_after: at(last + 1) == Cell::Empty,
        room,
    }
}

fn cell_of(board: &Board, pos: Option<Pos>, color: Stone) -> Cell {
    match pos {
        None => Cell::Edge,
        Some(p) => match board.get(p) {
            Stone::Empty => Cell::Empty,
            s if s == color => Cell::Own,
            _ => Cell::Other,
        },
    }
}

fn line_accessor(board: &Board, origin: Pos, dir: Direction, color: Stone) -> impl Fn(i32) -> Cell + '_ {
    let (dr, dc) = dir.delta();
    move |i| cell_of(board, origin.offset(dr, dc, i), color)
}

fn build_pattern(seg: &Segment, start: Pos, dir: Direction, owner: Stone, board: &Board) -> Pattern {
    let (dr, dc) = dir.delta();
    let mut completions = Vec::with_capacity(3);
    let mut push = |offset: i32| {
        if let Some(p) = start.offset(dr, dc, offset) {
            if board.is_empty(p) {
                completions.push(p);
            }
        }
    };
    if seg.open_before {
        push(-1);
    }
    if let Some(g) = seg.gap {
        push(g);
    }
    if seg.open_after {
        push(seg.last + 1);
    }
    Pattern {
        owner,
        shape: seg.shape(),
        direction: dir,
        stones: seg.stones,
        openness: seg.openness(),
        anchor: start,
        completions,
    }
}

/// Visit every segment of `color` with at least two stones.
fn for_each_segment(board: &Board, color: Stone, mut f: impl FnMut(Pos, Direction, &Segment)) {
    let Some(stones) = board.stones(color) else {
        return;
    };
    for pos in stones.iter_ones() {
        for dir in Direction::ALL {
            let at = line_accessor(board, pos, dir, color);
            // Only count from the start of a segment
            if at(-1) == Cell::Own {
                continue;
            }
            let seg = scan_segment(&at);
            if seg.stones >= 2 {
                f(pos, dir, &seg);
            }
        }
    }
}

// =============================================================================
// Shape counting
// =============================================================================

const SHAPE_KINDS: usize = Shape::Six as usize + 1;

/// Per-color tally of line shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeCounts {
    counts: [u16; SHAPE_KINDS],
}

impl ShapeCounts {
    #[inline]
    pub fn add(&mut self, shape: Shape) {
        self.counts[shape as usize] += 1;
    }

    #[inline]
    pub fn get(&self, shape: Shape) -> u16 {
        self.counts[shape as usize]
    }

    fn fours(&self) -> u16 {
        self.get(Shape::OpenFour) + self.get(Shape::ClosedFour)
    }

    /// Strongest combination formed by the counted lines, if any.
    pub fn combination(&self) -> Option<Shape> {
        let fours = self.fours();
        let threes = self.get(Shape::OpenThree);
        if fours >= 2 {
            Some(Shape::DoubleFour)
        } else if fours >= 1 && threes >= 1 {
            Some(Shape::FourThree)
        } else if threes >= 2 {
            Some(Shape::DoubleThree)
        } else {
            None
        }
    }

    /// Most severe shape, combinations included.
    pub fn best(&self) -> Shape {
        let line = (0..SHAPE_KINDS)
            .rev()
            .find(|&i| self.counts[i] > 0)
            .map_or(Shape::Dead, |i| SHAPES_BY_INDEX[i]);
        match self.combination() {
            Some(combo) if combo > line => combo,
            _ => line,
        }
    }

    /// Weighted sum of every line plus one combination bonus.
    pub fn value(&self) -> i32 {
        let lines: i32 = SHAPES_BY_INDEX
            .iter()
            .map(|&s| s.weight() * i32::from(self.get(s)))
            .sum();
        lines + self.combination().map_or(0, Shape::weight)
    }
}

const SHAPES_BY_INDEX: [Shape; SHAPE_KINDS] = [
    Shape::Dead,
    Shape::ClosedTwo,
    Shape::OpenTwo,
    Shape::ClosedThree,
    Shape::OpenThree,
    Shape::DoubleThree,
    Shape::ClosedFour,
    Shape::FourThree,
    Shape::DoubleFour,
    Shape::OpenFour,
    Shape::Five,
    Shape::Six,
];

/// Tally every segment of `color` on the board. Allocation-free.
pub fn shape_counts(board: &Board, color: Stone) -> ShapeCounts {
    let mut counts = ShapeCounts::default();
    for_each_segment(board, color, |_, _, seg| counts.add(seg.shape()));
    counts
}

// =============================================================================
// Public classification
// =============================================================================

/// Every line pattern of both colors plus their combinations, most severe first.
pub fn classify(board: &Board) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for owner in [Stone::Black, Stone::White] {
        let first = patterns.len();
        for_each_segment(board, owner, |start, dir, seg| {
            patterns.push(build_pattern(seg, start, dir, owner, board));
        });
        let own = patterns.split_off(first);
        patterns.extend(with_combination(own));
    }
    rank_patterns(&mut patterns);
    patterns
}

/// Line patterns through the stone at `pos`, one per direction at most.
/// Returns nothing for an empty cell.
pub fn classify_at(board: &Board, pos: Pos) -> Vec<Pattern> {
    let owner = board.get(pos);
    if owner == Stone::Empty {
        return Vec::new();
    }
    let mut patterns = Vec::new();
    for dir in Direction::ALL {
        let at = line_accessor(board, pos, dir, owner);
        if let Some((start, seg)) = segment_through(&at) {
            if seg.stones >= 2 {
                let (dr, dc) = dir.delta();
                if let Some(anchor) = pos.offset(dr, dc, start) {
                    patterns.push(build_pattern(&seg, anchor, dir, owner, board));
                }
            }
        }
    }
    let mut patterns = with_combination(patterns);
    rank_patterns(&mut patterns);
    patterns
}

/// Best shape `color` would own through `pos` after placing a stone there.
/// `pos` must be empty.
pub fn shape_if_placed(board: &Board, pos: Pos, color: Stone) -> Shape {
    let mut counts = ShapeCounts::default();
    for dir in Direction::ALL {
        let base = line_accessor(board, pos, dir, color);
        let at = |i: i32| if i == 0 { Cell::Own } else { base(i) };
        if let Some((_, seg)) = segment_through(&at) {
            counts.add(seg.shape());
        }
    }
    counts.best()
}

/// The strongest segment containing offset 0, with its start offset.
fn segment_through(at: &impl Fn(i32) -> Cell) -> Option<(i32, Segment)> {
    let mut best: Option<(i32, Segment)> = None;
    for start in -(WIN_LENGTH as i32)..=0 {
        if at(start) != Cell::Own || at(start - 1) == Cell::Own {
            continue;
        }
        let shifted = |i: i32| at(start + i);
        let seg = scan_segment(&shifted);
        if !seg.covers(-start) {
            continue;
        }
        if best.map_or(true, |(_, b)| seg.shape() > b.shape()) {
            best = Some((start, seg));
        }
    }
    best
}

/// Append a combination pattern when the lines form one.
fn with_combination(mut lines: Vec<Pattern>) -> Vec<Pattern> {
    let mut counts = ShapeCounts::default();
    for p in &lines {
        counts.add(p.shape);
    }
    let Some(combo) = counts.combination() else {
        return lines;
    };
    rank_patterns(&mut lines);
    let contributing: Vec<&Pattern> = lines
        .iter()
        .filter(|p| p.shape.is_four() || p.shape == Shape::OpenThree)
        .collect();
    if let Some(lead) = contributing.first() {
        let mut completions: Vec<Pos> = contributing
            .iter()
            .flat_map(|p| p.completions.iter().copied())
            .collect();
        completions.sort_unstable();
        completions.dedup();
        let combined = Pattern {
            owner: lead.owner,
            shape: combo,
            direction: lead.direction,
            stones: lead.stones,
            openness: lead.openness,
            anchor: lead.anchor,
            completions,
        };
        lines.push(combined);
    }
    lines
}
