//! Scoring and leveling

use serde::{Deserialize, Serialize};

/// Rows to clear before the level goes up
pub const ROWS_PER_LEVEL: u32 = 10;
/// Points per cell of soft drop (player or gravity)
pub const SOFT_DROP_POINTS: u32 = 1;
/// Flat bonus for two 4-row clears in a row
pub const BACK_TO_BACK_BONUS: u32 = 200;

/// Base points by number of rows cleared at once
const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Seconds per gravity step for levels 1 through 20
const FALL_INTERVALS: [f32; 20] = [
    1.0, 0.793, 0.6178, 0.4723, 0.3552, 0.2620, 0.18968, 0.13473, 0.09388, 0.06415, 0.04298,
    0.02822, 0.01815, 0.01144, 0.00706, 0.00426, 0.00252, 0.00146, 0.00082, 0.00046,
];

/// Points for clearing `rows` rows at once on `level`
pub fn line_clear_points(rows: usize, level: u32) -> u32 {
    LINE_SCORES.get(rows).copied().unwrap_or(0) * level
}

/// Gravity interval in seconds; levels past 20 keep the level 20 speed
pub fn fall_interval(level: u32) -> f32 {
    let index = level.clamp(1, FALL_INTERVALS.len() as u32) as usize - 1;
    FALL_INTERVALS[index]
}

/// What a row removal did to the score state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearOutcome {
    /// The back-to-back bonus was awarded
    pub back_to_back: bool,
    /// Levels gained by this clear
    pub levels_gained: u32,
}

/// Score state for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Current score
    pub points: u32,
    /// Current level, starting at 1
    pub level: u32,
    /// Rows cleared since the last level up
    pub level_lines: u32,
    /// Total rows cleared
    pub lines: u32,
    /// The last clear removed 4 rows and no piece has locked without clearing since
    pub back_to_back: bool,
    rows_per_level: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(ROWS_PER_LEVEL)
    }
}

impl Score {
    pub fn new(rows_per_level: u32) -> Self {
        Self {
            points: 0,
            level: 1,
            level_lines: 0,
            lines: 0,
            back_to_back: false,
            rows_per_level: rows_per_level.max(1),
        }
    }

    pub fn rows_per_level(&self) -> u32 {
        self.rows_per_level
    }

    /// Add drop points
    pub fn add_drop_points(&mut self, points: u32) {
        self.points += points;
    }

    /// Account for rows already removed from the board (their line points are
    /// added by the board). Applies the back-to-back bonus and levels up as
    /// many times as the cleared rows allow
    pub fn add_cleared_rows(&mut self, rows: usize) -> ClearOutcome {
        let mut outcome = ClearOutcome::default();
        if rows == 0 {
            return outcome;
        }

        let tetris = rows == 4;
        if tetris && self.back_to_back {
            self.points += BACK_TO_BACK_BONUS;
            outcome.back_to_back = true;
        }
        self.back_to_back = tetris;

        self.lines += rows as u32;
        self.level_lines += rows as u32;
        while self.level_lines >= self.rows_per_level {
            self.level += 1;
            self.level_lines -= self.rows_per_level;
            outcome.levels_gained += 1;
        }
        outcome
    }

    /// A piece locked without filling any row
    pub fn lock_without_clear(&mut self) {
        self.back_to_back = false;
    }

    /// Rows left before the next level
    pub fn lines_to_clear(&self) -> u32 {
        self.rows_per_level - self.level_lines
    }

    /// Gravity interval for the current level
    pub fn fall_interval(&self) -> f32 {
        fall_interval(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_points() {
        assert_eq!(line_clear_points(1, 3), 300);
        assert_eq!(line_clear_points(2, 1), 300);
        assert_eq!(line_clear_points(3, 2), 1000);
        assert_eq!(line_clear_points(4, 2), 1600);
        assert_eq!(line_clear_points(0, 5), 0);
    }

    #[test]
    fn test_fall_interval_table() {
        assert_eq!(fall_interval(1), 1.0);
        assert_eq!(fall_interval(7), 0.18968);
        assert_eq!(fall_interval(20), 0.00046);
        assert_eq!(fall_interval(35), 0.00046);
        assert_eq!(fall_interval(0), 1.0);
    }

    #[test]
    fn test_back_to_back() {
        let mut score = Score::new(ROWS_PER_LEVEL);
        assert!(!score.add_cleared_rows(4).back_to_back);
        assert_eq!(score.points, 0);
        assert!(score.add_cleared_rows(4).back_to_back);
        assert_eq!(score.points, BACK_TO_BACK_BONUS);
    }

    #[test]
    fn test_back_to_back_broken_by_plain_lock() {
        let mut score = Score::new(ROWS_PER_LEVEL);
        score.add_cleared_rows(4);
        score.lock_without_clear();
        assert!(!score.add_cleared_rows(4).back_to_back);
        assert_eq!(score.points, 0);
    }

    #[test]
    fn test_back_to_back_broken_by_smaller_clear() {
        let mut score = Score::new(ROWS_PER_LEVEL);
        score.add_cleared_rows(4);
        score.add_cleared_rows(2);
        assert!(!score.add_cleared_rows(4).back_to_back);
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::new(ROWS_PER_LEVEL);
        for _ in 0..9 {
            score.add_cleared_rows(1);
        }
        assert_eq!(score.level, 1);
        assert_eq!(score.lines_to_clear(), 1);
        let outcome = score.add_cleared_rows(4);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(score.level, 2);
        assert_eq!(score.level_lines, 3);
        assert_eq!(score.lines, 13);
        assert_eq!(score.fall_interval(), 0.793);
    }

    #[test]
    fn test_level_up_repeats() {
        let mut score = Score::new(2);
        let outcome = score.add_cleared_rows(4);
        assert_eq!(outcome.levels_gained, 2);
        assert_eq!(score.level, 3);
        assert_eq!(score.level_lines, 0);
    }
}
