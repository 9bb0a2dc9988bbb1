//! Collision and placement checks against the grid
//!
//! These are the strict readers: anything outside the field blocks. Plain
//! `Grid::get` stays lenient for rendering and scoring.

use crate::grid::Grid;
use crate::tetromino::Mask;
use serde::{Deserialize, Serialize};

/// Anchor of a hitbox on the grid: column `x`, internal row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Grid {
    /// True if the mask at `position` would sink through the floor (or poke
    /// above the buffer ceiling) or overlap a locked cell.
    pub fn collides_vertical(&self, mask: &Mask, position: Position) -> bool {
        mask.cells().any(|(mx, my)| {
            let x = position.x + mx;
            let y = position.y + my;
            y < 0 || y as usize >= self.rows() || self.get(x, y).is_filled()
        })
    }

    /// True if the mask at `position` would leave `[0, width)` or overlap a
    /// locked cell.
    pub fn collides_horizontal(&self, mask: &Mask, position: Position) -> bool {
        mask.cells().any(|(mx, my)| {
            let x = position.x + mx;
            let y = position.y + my;
            x < 0 || x as usize >= self.width() || self.get(x, y).is_filled()
        })
    }

    /// Both checks; used where a candidate can move on either axis
    /// (spawn, rotation kicks).
    pub fn collides(&self, mask: &Mask, position: Position) -> bool {
        self.collides_horizontal(mask, position) || self.collides_vertical(mask, position)
    }

    /// Corner probe for T-spin detection: occupied or off the field
    pub fn t_spin_check(&self, x: i32, y: i32) -> bool {
        self.is_blocked(x, y)
    }
}
