//! Active falling piece logic

use crate::collision::Position;
use crate::grid::Grid;
use crate::srs::get_wall_kicks;
use crate::tetromino::{Mask, PieceKind, Rotation, RotationDirection};
use serde::{Deserialize, Serialize};

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
    /// Top-left of the 4x4 hitbox, in internal grid coordinates
    pub position: Position,
    /// Which wall kick the last successful action used (for T-spin detection).
    /// 0 = last action was a translation (or nothing yet), 1-5 = kick index.
    pub last_kick: u8,
}

impl Piece {
    /// Create a piece of `kind` at the spawn point of `grid`: horizontally
    /// centred, resting in the buffer rows just above the visible area.
    pub fn spawn(kind: PieceKind, grid: &Grid) -> Self {
        let x = grid.width().saturating_sub(kind.spawn_width()) / 2;
        let y = grid.height().saturating_sub(2);
        Self {
            kind,
            rotation: Rotation::North,
            position: Position::new(x as i32, y as i32),
            last_kick: 0,
        }
    }

    pub fn mask(&self) -> Mask {
        self.kind.mask(self.rotation)
    }

    /// Absolute grid coordinates of every filled cell
    pub fn block_positions(&self) -> Vec<(i32, i32)> {
        let Position { x, y } = self.position;
        self.mask()
            .cells()
            .map(|(mx, my)| (x + mx, y + my))
            .collect()
    }

    /// True if the piece overlaps something where it stands (a blocked spawn)
    pub fn is_obstructed(&self, grid: &Grid) -> bool {
        grid.collides(&self.mask(), self.position)
    }

    pub fn move_left(&mut self, grid: &Grid) -> bool {
        self.shift(-1, grid)
    }

    pub fn move_right(&mut self, grid: &Grid) -> bool {
        self.shift(1, grid)
    }

    fn shift(&mut self, dx: i32, grid: &Grid) -> bool {
        let candidate = self.position.offset(dx, 0);
        if grid.collides_horizontal(&self.mask(), candidate) {
            return false;
        }
        self.position = candidate;
        self.last_kick = 0;
        true
    }

    /// Try to move down one row
    pub fn move_down(&mut self, grid: &Grid) -> bool {
        let candidate = self.position.offset(0, 1);
        if grid.collides_vertical(&self.mask(), candidate) {
            return false;
        }
        self.position = candidate;
        self.last_kick = 0;
        true
    }

    /// True if the piece is resting on the stack or the floor
    pub fn on_ground(&self, grid: &Grid) -> bool {
        grid.collides_vertical(&self.mask(), self.position.offset(0, 1))
    }

    /// Try to rotate, using SRS wall kicks. On failure nothing changes.
    pub fn rotate(&mut self, direction: RotationDirection, grid: &Grid) -> bool {
        let target = self.rotation.turn(direction);
        let mask = self.kind.mask(target);
        let kicks = get_wall_kicks(self.kind, self.rotation, direction);

        for (kick_idx, &(dx, dy)) in kicks.iter().enumerate() {
            let candidate = self.position.offset(dx, dy);
            if !grid.collides(&mask, candidate) {
                self.rotation = target;
                self.position = candidate;
                self.last_kick = (kick_idx + 1) as u8;
                return true;
            }
        }
        false
    }

    /// Move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, grid: &Grid) -> u32 {
        let mut distance = 0;
        while self.move_down(grid) {
            distance += 1;
        }
        distance
    }

    /// Where this piece would come to rest
    pub fn ghost(&self, grid: &Grid) -> Ghost {
        Ghost::project(self, grid)
    }

    pub fn is_t_piece(&self) -> bool {
        matches!(self.kind, PieceKind::T)
    }

    /// Whether the last successful action was a rotation
    pub fn last_move_was_rotation(&self) -> bool {
        self.last_kick > 0
    }
}

/// Landing projection of the active piece; only ever drawn, never locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    /// Kind of the piece being projected
    pub shape: PieceKind,
    pub rotation: Rotation,
    pub position: Position,
}

impl Ghost {
    pub fn project(piece: &Piece, grid: &Grid) -> Self {
        let mask = piece.mask();
        let mut position = piece.position;
        while !grid.collides_vertical(&mask, position.offset(0, 1)) {
            position = position.offset(0, 1);
        }
        Self {
            shape: piece.kind,
            rotation: piece.rotation,
            position,
        }
    }

    /// Cell kind to draw the ghost with
    pub fn kind(&self) -> PieceKind {
        PieceKind::Ghost
    }

    pub fn mask(&self) -> Mask {
        self.shape.mask(self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let grid = Grid::default();
        let piece = Piece::spawn(PieceKind::T, &grid);
        assert_eq!(piece.position, Position::new(3, 18));
        let line = Piece::spawn(PieceKind::Line, &grid);
        assert_eq!(line.position, Position::new(3, 18));
        // Spawned cells sit in the buffer, directly above the visible rows
        assert!(piece.block_positions().iter().all(|&(_, y)| y < 20));
        assert!(!piece.is_obstructed(&grid));
    }

    #[test]
    fn test_move_down() {
        let grid = Grid::default();
        let mut piece = Piece::spawn(PieceKind::T, &grid);
        let original = piece.position.y;
        assert!(piece.move_down(&grid));
        assert_eq!(piece.position.y, original + 1);
    }

    #[test]
    fn test_walls_stop_horizontal_moves() {
        let grid = Grid::default();
        let mut piece = Piece::spawn(PieceKind::Line, &grid);
        let mut moves = 0;
        while piece.move_left(&grid) {
            moves += 1;
        }
        assert_eq!(moves, 3);
        assert_eq!(piece.position.x, 0);
    }

    #[test]
    fn test_hard_drop_lands_on_floor() {
        let grid = Grid::default();
        let mut piece = Piece::spawn(PieceKind::Line, &grid);
        let distance = piece.hard_drop(&grid);
        assert_eq!(distance, 20);
        assert!(piece.block_positions().iter().all(|&(_, y)| y == 39));
        assert!(piece.on_ground(&grid));
    }

    #[test]
    fn test_ghost_matches_hard_drop() {
        let mut grid = Grid::default();
        grid.set(4, 35, PieceKind::Garbage);
        let piece = Piece::spawn(PieceKind::T, &grid);
        let ghost = piece.ghost(&grid);

        let mut dropped = piece.clone();
        dropped.hard_drop(&grid);

        assert_eq!(ghost.position, dropped.position);
        assert_eq!(ghost.kind(), PieceKind::Ghost);
        assert_eq!(ghost.mask(), piece.mask());
        // Projection never moves the source piece
        assert_eq!(piece.position, Position::new(3, 18));
    }

    #[test]
    fn test_rotation_records_kick() {
        let grid = Grid::default();
        let mut piece = Piece::spawn(PieceKind::T, &grid);
        assert!(piece.rotate(RotationDirection::Clockwise, &grid));
        assert_eq!(piece.rotation, Rotation::East);
        assert_eq!(piece.last_kick, 1);
        assert!(piece.last_move_was_rotation());
        assert!(piece.move_left(&grid));
        assert!(!piece.last_move_was_rotation());
    }

    #[test]
    fn test_rotation_kicks_off_wall() {
        let grid = Grid::default();
        let mut piece = Piece::spawn(PieceKind::T, &grid);
        assert!(piece.rotate(RotationDirection::Clockwise, &grid));
        while piece.move_left(&grid) {}
        // East-facing T hugging the left wall has its box one column outside
        assert_eq!(piece.position.x, -1);
        assert!(piece.rotate(RotationDirection::Clockwise, &grid));
        assert_eq!(piece.rotation, Rotation::South);
        assert_eq!(piece.last_kick, 2);
        assert_eq!(piece.position.x, 0);
        assert!(!piece.is_obstructed(&grid));
    }

    #[test]
    fn test_rejected_rotation_leaves_piece_untouched() {
        let mut grid = Grid::default();
        // Fill everything except a one-wide well at column 5, rows 36..40
        for y in 0..40 {
            for x in 0..10 {
                if !(x == 5 && y >= 36) {
                    grid.set(x, y, PieceKind::Garbage);
                }
            }
        }
        let mut piece = Piece {
            kind: PieceKind::Line,
            rotation: Rotation::East,
            position: Position::new(3, 36),
            last_kick: 0,
        };
        assert!(!piece.is_obstructed(&grid));
        let before = piece.clone();

        assert!(!piece.rotate(RotationDirection::Clockwise, &grid));
        assert!(!piece.rotate(RotationDirection::CounterClockwise, &grid));
        assert_eq!(piece, before);
    }
}
