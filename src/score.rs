//! Scoring system following modern Tetris guidelines

use crate::events::Scoreboard;
use crate::field::{ClearReport, TSpin};
use serde::{Deserialize, Serialize};

/// Frames per second of the fixed-step loop
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Type of line clear for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearType {
    /// Regular line clear (1-4 lines)
    Regular(u8),
    /// T-Spin with lines cleared (0-3)
    TSpin(u8),
    /// Mini T-Spin with lines cleared (0-1)
    MiniTSpin(u8),
}

impl ClearType {
    pub fn from_report(report: &ClearReport) -> Self {
        let lines = report.lines_cleared.min(u8::MAX as usize) as u8;
        match report.t_spin {
            TSpin::Full => ClearType::TSpin(lines),
            TSpin::Mini => ClearType::MiniTSpin(lines),
            TSpin::None => ClearType::Regular(lines),
        }
    }

    pub fn lines(&self) -> u32 {
        match *self {
            ClearType::Regular(n) | ClearType::TSpin(n) | ClearType::MiniTSpin(n) => u32::from(n),
        }
    }

    pub fn is_t_spin(&self) -> bool {
        !matches!(self, ClearType::Regular(_))
    }
}

/// Score tracking for one player; the default scoreboard of a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub points: u64,
    pub level: u32,
    pub starting_level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Current combo count (-1 = no combo)
    pub combo: i32,
    /// Whether last clear was a "difficult" clear (quad or t-spin)
    pub back_to_back: bool,
    /// Top of the stack is close to the ceiling
    pub in_stress: bool,
    pub game_over: bool,
    /// Name of the last scoring clear, e.g. "B2B Tetris Combo x2"
    pub last_action: Option<String>,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Score {
    pub fn new(starting_level: u32) -> Self {
        Self {
            points: 0,
            level: starting_level,
            starting_level,
            lines: 0,
            combo: -1,
            back_to_back: false,
            in_stress: false,
            game_over: false,
            last_action: None,
        }
    }

    /// Add the points for one clear and return its display name,
    /// e.g. "B2B Tetris Combo x2"
    pub fn add_clear(&mut self, clear_type: ClearType, all_clear: bool) -> String {
        let (base, difficult, name) = clear_value(clear_type);
        let lines = clear_type.lines();
        let clearing = lines > 0;
        // Only clears that remove rows extend or break the streaks
        let chained = clearing && difficult && self.back_to_back;

        self.lines += lines;
        self.level = self.starting_level + self.lines / 10;
        let level = u64::from(self.level);

        if clearing {
            self.back_to_back = difficult;
            self.combo += 1;
        }

        let mut earned = base * level;
        if chained {
            earned = earned * 3 / 2;
        }
        let combo = if clearing { self.combo.max(0) as u64 } else { 0 };
        earned += 50 * combo * level;
        if all_clear {
            earned += all_clear_bonus(lines, chained) * level;
        }
        self.points += earned;

        let mut label = String::new();
        if chained {
            label.push_str("B2B ");
        }
        label.push_str(name);
        if combo > 0 {
            label.push_str(&format!(" Combo x{combo}"));
        }
        if all_clear {
            label.push_str(" ALL CLEAR!");
        }
        label
    }

    /// Soft drop: 1 point per cell
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Hard drop: 2 points per cell
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Called when a piece locks without clearing lines
    pub fn reset_combo(&mut self) {
        self.combo = -1;
    }

    /// Seconds per row for the current level (guideline gravity formula)
    pub fn fall_speed(&self) -> f64 {
        let level = self.level.clamp(1, 20) as f64;
        (0.8 - ((level - 1.0) * 0.007)).powf(level - 1.0)
    }

    /// Frames per row at 60 fps, scaled by the gravity multiplier
    pub fn gravity_frames(&self, multiplier: f64) -> u32 {
        let frames = self.fall_speed() * FRAMES_PER_SECOND / multiplier;
        (frames.round() as u32).max(1)
    }
}

/// Base points per level, whether the clear counts as difficult, and its name
fn clear_value(clear_type: ClearType) -> (u64, bool, &'static str) {
    match clear_type {
        ClearType::Regular(1) => (100, false, "Single"),
        ClearType::Regular(2) => (300, false, "Double"),
        ClearType::Regular(3) => (500, false, "Triple"),
        ClearType::Regular(4) => (800, true, "Tetris"),
        ClearType::TSpin(0) => (400, true, "T-Spin"),
        ClearType::TSpin(1) => (800, true, "T-Spin Single"),
        ClearType::TSpin(2) => (1200, true, "T-Spin Double"),
        ClearType::TSpin(3) => (1600, true, "T-Spin Triple"),
        ClearType::MiniTSpin(0) => (100, false, "Mini T-Spin"),
        ClearType::MiniTSpin(_) => (200, false, "Mini T-Spin Single"),
        ClearType::Regular(_) | ClearType::TSpin(_) => (0, false, ""),
    }
}

/// All-clear bonus per level; a back-to-back tetris earns the top bonus
fn all_clear_bonus(lines: u32, back_to_back: bool) -> u64 {
    match lines {
        1 => 800,
        2 => 1200,
        3 => 1800,
        4 if back_to_back => 3200,
        4 => 2000,
        _ => 0,
    }
}

impl Scoreboard for Score {
    fn report_lines_cleared(&mut self, report: &ClearReport) {
        let clear_type = ClearType::from_report(report);
        if report.lines_cleared > 0 || clear_type.is_t_spin() {
            self.last_action = Some(self.add_clear(clear_type, report.all_clear));
        } else {
            self.reset_combo();
            self.last_action = None;
        }
    }

    fn report_stress(&mut self, in_stress: bool) {
        self.in_stress = in_stress;
    }

    fn report_game_over(&mut self) {
        self.game_over = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(lines: usize, t_spin: TSpin, all_clear: bool) -> ClearReport {
        ClearReport {
            lines_cleared: lines,
            non_garbage_lines: lines,
            t_spin,
            all_clear,
        }
    }

    #[test]
    fn test_single_clear() {
        let mut score = Score::new(1);
        score.add_clear(ClearType::Regular(1), false);
        assert_eq!(score.points, 100);
        assert_eq!(score.lines, 1);
    }

    #[test]
    fn test_back_to_back() {
        let mut score = Score::new(1);
        score.add_clear(ClearType::Regular(4), false);
        assert_eq!(score.points, 800);
        // 800 base * 1.5 b2b + 50 combo
        score.add_clear(ClearType::Regular(4), false);
        assert_eq!(score.points, 800 + 1200 + 50);
    }

    #[test]
    fn test_labels_mark_chained_clears() {
        let mut score = Score::new(1);
        assert_eq!(score.add_clear(ClearType::Regular(4), false), "Tetris");
        assert_eq!(
            score.add_clear(ClearType::TSpin(1), false),
            "B2B T-Spin Single Combo x1"
        );
        assert_eq!(score.add_clear(ClearType::Regular(1), false), "Single Combo x2");
        assert!(!score.back_to_back);
    }

    #[test]
    fn test_all_clear_tetris_bonus_needs_a_chain() {
        let mut first = Score::new(1);
        first.add_clear(ClearType::Regular(4), true);
        assert_eq!(first.points, 800 + 2000);

        let mut chained = Score::new(1);
        chained.add_clear(ClearType::Regular(4), false);
        chained.add_clear(ClearType::Regular(4), true);
        assert_eq!(chained.points, 800 + 1200 + 50 + 3200);
    }

    #[test]
    fn test_level_up_from_starting_level() {
        let mut score = Score::new(3);
        for _ in 0..10 {
            score.add_clear(ClearType::Regular(1), false);
        }
        assert_eq!(score.level, 4);
    }

    #[test]
    fn test_report_without_lines_breaks_combo() {
        let mut score = Score::new(1);
        score.report_lines_cleared(&report(1, TSpin::None, false));
        score.report_lines_cleared(&report(1, TSpin::None, false));
        assert_eq!(score.combo, 1);
        score.report_lines_cleared(&report(0, TSpin::None, false));
        assert_eq!(score.combo, -1);
        assert_eq!(score.last_action, None);
    }

    #[test]
    fn test_t_spin_report_scores() {
        let mut score = Score::new(1);
        score.report_lines_cleared(&report(2, TSpin::Full, false));
        assert_eq!(score.points, 1200);
        assert_eq!(score.last_action.as_deref(), Some("T-Spin Double"));
        assert!(score.back_to_back);
    }

    #[test]
    fn test_all_clear_bonus() {
        let mut score = Score::new(1);
        score.report_lines_cleared(&report(1, TSpin::None, true));
        assert_eq!(score.points, 100 + 800);
        assert!(score.last_action.unwrap().ends_with("ALL CLEAR!"));
    }

    #[test]
    fn test_stress_and_game_over_are_recorded() {
        let mut score = Score::default();
        score.report_stress(true);
        score.report_game_over();
        assert!(score.in_stress);
        assert!(score.game_over);
    }

    #[test]
    fn test_gravity_frames() {
        let score = Score::new(1);
        assert_eq!(score.gravity_frames(1.0), 60);
        assert_eq!(score.gravity_frames(2.0), 30);
        let fast = Score::new(15);
        assert!(fast.gravity_frames(5.0) >= 1);
    }
}
