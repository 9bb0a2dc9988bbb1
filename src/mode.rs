//! Game modes: Marathon, Sprint, Versus
//!
//! Timers count frames of the fixed-step loop rather than wall time, so a
//! replayed input sequence ends the same way.

use crate::score::FRAMES_PER_SECOND;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Marathon, // Endless, level increases every 10 lines
    Sprint,   // Clear 40 lines as fast as possible
    Versus,   // Two fields exchanging garbage
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Marathon => "Marathon",
            GameMode::Sprint => "Sprint",
            GameMode::Versus => "Versus",
        }
    }
}

/// Mode-specific progress
#[derive(Debug, Clone)]
pub struct ModeState {
    pub mode: GameMode,
    pub frames: u64,
    /// For Sprint: lines to clear
    pub target_lines: u32,
}

impl ModeState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            frames: 0,
            target_lines: 40,
        }
    }

    pub fn update(&mut self) {
        self.frames += 1;
    }

    /// Check if game is complete based on mode
    pub fn is_complete(&self, lines_cleared: u32) -> bool {
        match self.mode {
            GameMode::Marathon | GameMode::Versus => false,
            GameMode::Sprint => lines_cleared >= self.target_lines,
        }
    }

    /// Format elapsed time as MM:SS.mmm
    pub fn format_time(&self) -> String {
        let total_millis = (self.frames as f64 * 1000.0 / FRAMES_PER_SECOND) as u64;
        let minutes = total_millis / 60000;
        let seconds = (total_millis % 60000) / 1000;
        let millis = total_millis % 1000;
        format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_completes_at_target() {
        let state = ModeState::new(GameMode::Sprint);
        assert!(!state.is_complete(39));
        assert!(state.is_complete(40));
    }

    #[test]
    fn test_format_time() {
        let mut state = ModeState::new(GameMode::Marathon);
        state.frames = 60 * 61 + 30;
        assert_eq!(state.format_time(), "01:01.500");
    }
}
