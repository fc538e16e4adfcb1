//! Pattern scores for Connect6 evaluation
//!
//! Weights rise steeply with severity so that one open four outweighs a
//! board full of twos and threes. Static scores stay inside the critical
//! band; only a completed or proven six reaches the decisive band.

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Six in a row: game over
    pub const WIN: i32 = 10_000_000;

    /// Five with an open sixth cell: one stone from a win
    pub const FIVE: i32 = 400_000;
    /// Open four: _OOOO_
    pub const OPEN_FOUR: i32 = 300_000;
    /// Two fours at once (combination bonus)
    pub const DOUBLE_FOUR: i32 = 250_000;
    /// Four plus open three (combination bonus)
    pub const FOUR_THREE: i32 = 200_000;
    /// Four with one open end or one inner gap
    pub const CLOSED_FOUR: i32 = 100_000;
    /// Two open threes (combination bonus)
    pub const DOUBLE_THREE: i32 = 60_000;
    /// Open three: _OOO_
    pub const OPEN_THREE: i32 = 20_000;
    pub const CLOSED_THREE: i32 = 3_000;
    pub const OPEN_TWO: i32 = 800;
    pub const CLOSED_TWO: i32 = 150;

    /// Static evaluations are clamped below the decisive band.
    pub const EVAL_LIMIT: i32 = 999_999;
}

/// Coarse meaning of a score, used to decide whether a cutoff can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreBand {
    /// |score| < 10,000
    Balanced,
    /// tens of thousands
    Advantage,
    /// hundreds of thousands
    Critical,
    /// millions: forced win or loss
    Decisive,
}

impl ScoreBand {
    #[must_use]
    pub fn of(score: i32) -> ScoreBand {
        match score.unsigned_abs() {
            0..=9_999 => ScoreBand::Balanced,
            10_000..=99_999 => ScoreBand::Advantage,
            100_000..=999_999 => ScoreBand::Critical,
            _ => ScoreBand::Decisive,
        }
    }
}

/// Potential of a live six-cell window by the number of own stones in it.
/// A window is live for a color when it holds none of the opponent's stones.
pub const WINDOW_POTENTIAL: [i32; 7] = [0, 4, 20, 80, 300, 900, 900];
