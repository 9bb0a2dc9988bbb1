//! Super Rotation System (SRS) wall kick data
//!
//! If a rotation would collide, these offsets are tried in order.
//! Offsets are (dx, dy) with x growing right and y growing down, matching
//! the grid's internal row order.

use crate::tetromino::{PieceKind, Rotation, RotationDirection};

/// Number of kick candidates per rotation attempt
pub const KICK_COUNT: usize = 5;

pub type Kicks = [(i32, i32); KICK_COUNT];

/// Get wall kick offsets for a rotation attempt
pub fn get_wall_kicks(kind: PieceKind, from: Rotation, direction: RotationDirection) -> Kicks {
    match kind {
        PieceKind::Line => line_kicks(from, direction),
        PieceKind::T | PieceKind::S | PieceKind::Z | PieceKind::L | PieceKind::J => {
            jlstz_kicks(from, direction)
        }
        // Block rotates in place; the rest never rotate
        _ => [(0, 0); KICK_COUNT],
    }
}

fn jlstz_kicks(from: Rotation, direction: RotationDirection) -> Kicks {
    use Rotation::*;
    use RotationDirection::*;

    match (from, direction) {
        // 0->R, 2->R
        (North, Clockwise) | (South, CounterClockwise) => {
            [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]
        }
        // R->0, R->2
        (East, CounterClockwise) | (East, Clockwise) => {
            [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]
        }
        // 2->L, 0->L
        (South, Clockwise) | (North, CounterClockwise) => {
            [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]
        }
        // L->2, L->0
        (West, CounterClockwise) | (West, Clockwise) => {
            [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]
        }
    }
}

fn line_kicks(from: Rotation, direction: RotationDirection) -> Kicks {
    use Rotation::*;
    use RotationDirection::*;

    match (from, direction) {
        // 0->R, L->2
        (North, Clockwise) | (West, CounterClockwise) => {
            [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)]
        }
        // R->0, 2->L
        (East, CounterClockwise) | (South, Clockwise) => {
            [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)]
        }
        // R->2, 0->L
        (East, Clockwise) | (North, CounterClockwise) => {
            [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)]
        }
        // 2->R, L->0
        (South, CounterClockwise) | (West, Clockwise) => {
            [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)]
        }
    }
}
