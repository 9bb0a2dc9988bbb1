//! Grid store: the locked cells of one playfield
//!
//! The grid keeps `2 * height` internal rows. Row 0 is the topmost internal
//! row and indices grow downward; the upper half is a hidden buffer so pieces
//! can spawn and fall into view, and the visible rows are
//! `[height, 2 * height)`.

use crate::tetromino::PieceKind;
use serde::{Deserialize, Serialize};

/// Standard playfield dimensions
pub const DEFAULT_WIDTH: usize = 10;
pub const VISIBLE_HEIGHT: usize = 20;
pub const MIN_WIDTH: usize = 4;
pub const MAX_WIDTH: usize = 12;

/// One row of cells, leftmost column first
pub type Row = Vec<PieceKind>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Stored as [row][col], row 0 is the top of the buffer
    cells: Vec<Row>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, VISIBLE_HEIGHT)
    }
}

impl Grid {
    /// Create an empty grid. Width is validated by `Config` before this is reached.
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!((MIN_WIDTH..=MAX_WIDTH).contains(&width));
        Self {
            width,
            height,
            cells: vec![vec![PieceKind::None; width]; height * 2],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible play height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total internal rows, buffer included
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// Internal index of a visible row (0 = top of the visible area)
    pub fn to_internal(&self, visible_row: usize) -> usize {
        visible_row + self.height
    }

    /// Visible index of an internal row, `None` for buffer rows
    pub fn to_visible(&self, internal_row: usize) -> Option<usize> {
        internal_row
            .checked_sub(self.height)
            .filter(|&row| row < self.height)
    }

    pub fn is_visible_row(&self, internal_row: usize) -> bool {
        self.to_visible(internal_row).is_some()
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.rows()
    }

    /// Lenient read: anything outside the grid reads as empty
    pub fn get(&self, x: i32, y: i32) -> PieceKind {
        if !self.in_bounds(x, y) {
            return PieceKind::None;
        }
        self.cells[y as usize][x as usize]
    }

    /// Write a cell. Returns false if out of bounds.
    pub fn set(&mut self, x: i32, y: i32, kind: PieceKind) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.cells[y as usize][x as usize] = kind;
        true
    }

    /// Strict occupancy probe: out of bounds counts as occupied
    pub(crate) fn is_blocked(&self, x: i32, y: i32) -> bool {
        !self.in_bounds(x, y) || self.cells[y as usize][x as usize].is_filled()
    }

    /// Reset every cell to `None`
    pub fn empty(&mut self) {
        for row in &mut self.cells {
            row.fill(PieceKind::None);
        }
    }

    pub fn row(&self, y: usize) -> Option<&[PieceKind]> {
        self.cells.get(y).map(Vec::as_slice)
    }

    /// Every row from the top of the buffer down
    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(PieceKind::is_filled))
    }

    pub fn is_row_occupied(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().any(PieceKind::is_filled))
    }

    /// Indices of complete rows, ascending (top to bottom), buffer included
    pub fn full_rows(&self) -> Vec<usize> {
        (0..self.rows()).filter(|&y| self.is_row_full(y)).collect()
    }

    /// Remove row `y`: every row above it moves down one index and a fresh
    /// empty row appears at index 0. Rows below `y` keep their index.
    pub fn clear_row(&mut self, y: usize) {
        if y >= self.rows() {
            return;
        }
        self.cells.remove(y);
        self.cells.insert(0, vec![PieceKind::None; self.width]);
    }

    /// True when every visible cell is empty; buffer rows are ignored
    pub fn visible_is_empty(&self) -> bool {
        (self.height..self.rows()).all(|y| !self.is_row_occupied(y))
    }

    /// Number of non-empty cells anywhere in the grid
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_filled()).count())
            .sum()
    }

    /// Push the whole stack up by `rows.len()` and write `rows` into the freed
    /// bottom slots, first row on top. Cells pushed above row 0 are lost.
    pub fn push_up(&mut self, rows: Vec<Row>) {
        let count = rows.len().min(self.rows());
        if count == 0 {
            return;
        }
        self.cells.drain(..count);
        for mut row in rows.into_iter().take(count) {
            row.resize(self.width, PieceKind::None);
            self.cells.push(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, y: usize, kind: PieceKind) {
        for x in 0..grid.width() {
            grid.set(x as i32, y as i32, kind);
        }
    }

    #[test]
    fn test_new_grid_is_empty_and_double_height() {
        let grid = Grid::new(10, 20);
        assert_eq!(grid.rows(), 40);
        assert_eq!(grid.filled_count(), 0);
        assert!(grid.visible_is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::default();
        assert!(grid.set(5, 30, PieceKind::T));
        assert_eq!(grid.get(5, 30), PieceKind::T);
    }

    #[test]
    fn test_out_of_bounds_reads_as_empty() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 39, PieceKind::Block);
        assert_eq!(grid.get(-1, 39), PieceKind::None);
        assert_eq!(grid.get(10, 39), PieceKind::None);
        assert_eq!(grid.get(0, 40), PieceKind::None);
        assert_eq!(grid.get(0, -1), PieceKind::None);
        assert!(!grid.set(10, 0, PieceKind::T));
        assert!(grid.is_blocked(-1, 0));
        assert!(grid.is_blocked(0, 40));
    }

    #[test]
    fn test_visible_translation() {
        let grid = Grid::new(10, 20);
        assert_eq!(grid.to_internal(0), 20);
        assert_eq!(grid.to_visible(39), Some(19));
        assert_eq!(grid.to_visible(19), None);
        assert_eq!(grid.to_visible(40), None);
    }

    #[test]
    fn test_clear_row_shifts_rows_above() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 39, PieceKind::Block);
        grid.set(3, 38, PieceKind::T);
        grid.set(0, 0, PieceKind::S);
        let before = grid.filled_count();

        grid.clear_row(39);

        assert_eq!(grid.get(3, 39), PieceKind::T);
        assert_eq!(grid.get(0, 1), PieceKind::S);
        assert!(!grid.is_row_occupied(0));
        assert_eq!(grid.filled_count(), before - 10);
    }

    #[test]
    fn test_full_rows_ascending() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 39, PieceKind::Block);
        fill_row(&mut grid, 25, PieceKind::Garbage);
        fill_row(&mut grid, 5, PieceKind::Line);
        assert_eq!(grid.full_rows(), vec![5, 25, 39]);
    }

    #[test]
    fn test_buffer_cells_do_not_break_all_clear() {
        let mut grid = Grid::default();
        grid.set(4, 19, PieceKind::Z);
        assert!(grid.visible_is_empty());
        grid.set(4, 20, PieceKind::Z);
        assert!(!grid.visible_is_empty());
    }

    #[test]
    fn test_push_up_writes_bottom_rows() {
        let mut grid = Grid::default();
        grid.set(2, 39, PieceKind::J);
        let mut first = vec![PieceKind::Garbage; 10];
        first[0] = PieceKind::None;
        let mut second = vec![PieceKind::Garbage; 10];
        second[9] = PieceKind::None;

        grid.push_up(vec![first, second]);

        assert_eq!(grid.rows(), 40);
        assert_eq!(grid.get(2, 37), PieceKind::J);
        assert_eq!(grid.get(0, 38), PieceKind::None);
        assert_eq!(grid.get(1, 38), PieceKind::Garbage);
        assert_eq!(grid.get(9, 39), PieceKind::None);
    }

    #[test]
    fn test_empty_resets_everything() {
        let mut grid = Grid::default();
        fill_row(&mut grid, 30, PieceKind::L);
        grid.empty();
        assert_eq!(grid, Grid::default());
    }
}
