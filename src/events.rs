//! Collaborators the playfield talks to across its boundary
//!
//! The core never waits on any of these. Animation requests are
//! fire-and-forget, score reports are one-way, and the piece source is asked
//! for exactly one kind per lock.

use crate::field::ClearReport;
use crate::tetromino::{PieceKind, Rgb};

/// Rectangle of cells in internal grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellArea {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Visual effect requests. Every method defaults to doing nothing.
pub trait Animator {
    /// Flash a row that is about to be removed
    fn row_flash(&mut self, _row: usize, _color: Rgb) {}

    /// Throw a single block out of a cleared row
    fn block_burst(&mut self, _x: usize, _y: usize, _velocity: (f32, f32), _color: Rgb) {}

    fn explosion(&mut self, _area: CellArea) {}

    fn screen_shake(&mut self) {}
}

/// Receives the results of every lock
pub trait Scoreboard {
    fn report_lines_cleared(&mut self, report: &ClearReport);

    /// Whether the top of the visible stack is occupied after the lock
    fn report_stress(&mut self, in_stress: bool);

    fn report_game_over(&mut self);
}

/// Queue generator handing out the next active piece
pub trait PieceSource {
    fn request_next_piece(&mut self) -> PieceKind;
}

/// Animator that drops every request
#[derive(Debug, Clone, Copy, Default)]
pub struct Quiet;

impl Animator for Quiet {}
