//! Tetromino definitions and shapes
//!
//! Every cell kind the playfield can hold, plus the per-rotation hitbox masks
//! for the seven tetrominoes (SRS spawn orientation, y grows downward).

use serde::{Deserialize, Serialize};

/// Side length of the square hitbox every shape lives in
pub const HITBOX_SIZE: usize = 4;

/// What occupies a grid cell (or what an active piece is made of)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PieceKind {
    #[default]
    None,
    Block, // Yellow - square
    Line,  // Cyan - long bar
    T,     // Purple
    S,     // Green
    Z,     // Red
    L,     // Orange
    J,     // Blue
    Ghost,
    Garbage,
}

/// Plain RGB color handed to the rendering and animation collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Box cells (x, y) per rotation state, clockwise from spawn
type ShapeTable = [[(u8, u8); 4]; 4];

const LINE_SHAPE: ShapeTable = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

const BLOCK_SHAPE: ShapeTable = [[(1, 0), (2, 0), (1, 1), (2, 1)]; 4];

// .T.    .T.    ...    .T.
// TTT    .TT    TTT    TT.
// ...    .T.    .T.    .T.
const T_SHAPE: ShapeTable = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

// .SS    .S.    ...    S..
// SS.    .SS    .SS    SS.
// ...    ..S    SS.    .S.
const S_SHAPE: ShapeTable = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

// ZZ.    ..Z    ...    .Z.
// .ZZ    .ZZ    ZZ.    ZZ.
// ...    .Z.    .ZZ    Z..
const Z_SHAPE: ShapeTable = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

const L_SHAPE: ShapeTable = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

const J_SHAPE: ShapeTable = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

impl PieceKind {
    /// The seven kinds the bag deals out
    pub fn playable() -> [PieceKind; 7] {
        [
            PieceKind::Block,
            PieceKind::Line,
            PieceKind::T,
            PieceKind::S,
            PieceKind::Z,
            PieceKind::L,
            PieceKind::J,
        ]
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PieceKind::None)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_playable(&self) -> bool {
        self.shape_table().is_some()
    }

    /// Width of the box the spawn orientation occupies
    pub fn spawn_width(&self) -> usize {
        match self {
            PieceKind::Line | PieceKind::Block => 4,
            _ => 3,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            PieceKind::None => Rgb(0, 0, 0),
            PieceKind::Block => Rgb(255, 255, 0),
            PieceKind::Line => Rgb(0, 255, 255),
            PieceKind::T => Rgb(160, 0, 240),
            PieceKind::S => Rgb(0, 240, 0),
            PieceKind::Z => Rgb(240, 0, 0),
            PieceKind::L => Rgb(255, 165, 0),
            PieceKind::J => Rgb(0, 0, 240),
            PieceKind::Ghost => Rgb(128, 128, 128),
            PieceKind::Garbage => Rgb(96, 96, 96),
        }
    }

    fn shape_table(&self) -> Option<&'static ShapeTable> {
        match self {
            PieceKind::Block => Some(&BLOCK_SHAPE),
            PieceKind::Line => Some(&LINE_SHAPE),
            PieceKind::T => Some(&T_SHAPE),
            PieceKind::S => Some(&S_SHAPE),
            PieceKind::Z => Some(&Z_SHAPE),
            PieceKind::L => Some(&L_SHAPE),
            PieceKind::J => Some(&J_SHAPE),
            PieceKind::None | PieceKind::Ghost | PieceKind::Garbage => None,
        }
    }

    /// Hitbox mask for this kind at a rotation state.
    /// Non-tetromino kinds have an empty mask.
    pub fn mask(&self, rotation: Rotation) -> Mask {
        let mut mask = Mask::default();
        if let Some(table) = self.shape_table() {
            for &(x, y) in &table[rotation.index()] {
                mask.0[y as usize][x as usize] = true;
            }
        }
        mask
    }
}

/// A 4x4 hitbox, indexed `[y][x]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mask(pub [[bool; HITBOX_SIZE]; HITBOX_SIZE]);

impl Mask {
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < HITBOX_SIZE && y < HITBOX_SIZE && self.0[y][x]
    }

    /// Iterate the filled box cells as (x, y)
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..HITBOX_SIZE).flat_map(move |y| {
            (0..HITBOX_SIZE)
                .filter(move |&x| self.0[y][x])
                .map(move |x| (x as i32, y as i32))
        })
    }

    pub fn count(&self) -> usize {
        self.cells().count()
    }
}

/// Rotation states, clockwise from spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,
    South,
    West,
}

impl Rotation {
    pub fn index(&self) -> usize {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    pub fn ccw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    pub fn turn(&self, direction: RotationDirection) -> Rotation {
        match direction {
            RotationDirection::Clockwise => self.cw(),
            RotationDirection::CounterClockwise => self.ccw(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn test_every_playable_mask_has_four_cells() {
        for kind in PieceKind::playable() {
            for rotation in ROTATIONS {
                assert_eq!(kind.mask(rotation).count(), 4, "{kind:?} {rotation:?}");
            }
        }
    }

    #[test]
    fn test_non_tetromino_masks_are_empty() {
        for kind in [PieceKind::None, PieceKind::Ghost, PieceKind::Garbage] {
            assert_eq!(kind.mask(Rotation::North).count(), 0);
            assert!(!kind.is_playable());
        }
    }

    #[test]
    fn test_rotation_cycle() {
        let mut rotation = Rotation::North;
        for _ in 0..4 {
            rotation = rotation.cw();
        }
        assert_eq!(rotation, Rotation::North);
        assert_eq!(Rotation::North.ccw(), Rotation::West);
        assert_eq!(Rotation::West.turn(RotationDirection::Clockwise), Rotation::North);
    }

    #[test]
    fn test_t_pivot_is_center_in_all_states() {
        for rotation in ROTATIONS {
            assert!(PieceKind::T.mask(rotation).get(1, 1));
        }
    }

    #[test]
    fn test_block_does_not_change_shape() {
        let spawn = PieceKind::Block.mask(Rotation::North);
        for rotation in ROTATIONS {
            assert_eq!(PieceKind::Block.mask(rotation), spawn);
        }
    }
}
