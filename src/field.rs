//! Playfield and the lock pipeline
//!
//! Every time a piece comes to rest, `Field::lock_piece` runs the same fixed
//! sequence: commit cells, classify T-spins, find full rows, request
//! animations, eliminate rows, check for an all-clear, report the clear,
//! check stress, spawn the next piece and reset the per-lock flags.

use crate::collision::Position;
use crate::config::{ConfigError, FieldConfig, RulesConfig};
use crate::events::{Animator, CellArea, PieceSource, Scoreboard};
use crate::grid::{Grid, VISIBLE_HEIGHT};
use crate::piece::Piece;
use crate::srs::KICK_COUNT;
use crate::tetromino::{PieceKind, Rotation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Rows cleared at once that count as a Tetris and shake the screen
pub const TETRIS_ROWS: usize = 4;

/// Horizontal speed per column of distance from the centre, and launch speed
const BURST_SPREAD: f32 = 60.0;
const BURST_LIFT: f32 = -400.0;

/// T-spin classification of a lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TSpin {
    #[default]
    None,
    Mini,
    Full,
}

/// What one lock cleared, handed to the scoreboard in the completion phase
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClearReport {
    /// Rows removed, garbage included
    pub lines_cleared: usize,
    /// Rows removed that were not opponent garbage
    pub non_garbage_lines: usize,
    pub t_spin: TSpin,
    pub all_clear: bool,
}

impl ClearReport {
    pub fn is_tetris(&self) -> bool {
        self.lines_cleared == TETRIS_ROWS
    }
}

/// Collaborators one lock talks to
pub struct LockContext<'a> {
    pub animator: &'a mut dyn Animator,
    pub scoreboard: &'a mut dyn Scoreboard,
    pub pieces: &'a mut dyn PieceSource,
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub report: ClearReport,
    /// Internal indices of the rows removed, as found before elimination
    pub cleared_rows: Vec<usize>,
    pub in_stress: bool,
    /// The freshly spawned piece, `None` when it could not spawn
    pub next_piece: Option<Piece>,
}

impl LockOutcome {
    pub fn topped_out(&self) -> bool {
        self.next_piece.is_none()
    }
}

/// Corner thresholds for T-spin classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TSpinRule {
    corners: usize,
    front: usize,
}

/// Save-state of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub grid: Grid,
    pub t_spin: bool,
    pub mini_t_spin: bool,
    pub all_clear: bool,
    pub blocks_being_added: usize,
    pub in_stress: bool,
}

/// One player's playfield
#[derive(Debug, Clone)]
pub struct Field {
    grid: Grid,
    pub t_spin: bool,
    pub mini_t_spin: bool,
    pub all_clear: bool,
    /// Garbage rows waiting to be pushed in, for display only
    pub blocks_being_added: usize,
    in_stress: bool,
    t_spin_rule: TSpinRule,
}

impl Field {
    /// Build an empty field. Fails fast on a width the grid cannot hold.
    pub fn new(field: &FieldConfig, rules: &RulesConfig) -> Result<Self, ConfigError> {
        field.validate()?;
        rules.validate()?;
        Ok(Self {
            grid: Grid::new(field.width, VISIBLE_HEIGHT),
            t_spin: false,
            mini_t_spin: false,
            all_clear: false,
            blocks_being_added: 0,
            in_stress: false,
            t_spin_rule: TSpinRule {
                corners: rules.t_spin_corner_threshold as usize,
                front: rules.t_spin_front_corners as usize,
            },
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Cell kind at a visible coordinate, for drawing
    pub fn visible_cell(&self, x: usize, visible_row: usize) -> PieceKind {
        let y = self.grid.to_internal(visible_row);
        self.grid.get(x as i32, y as i32)
    }

    pub fn in_stress(&self) -> bool {
        self.in_stress
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            grid: self.grid.clone(),
            t_spin: self.t_spin,
            mini_t_spin: self.mini_t_spin,
            all_clear: self.all_clear,
            blocks_being_added: self.blocks_being_added,
            in_stress: self.in_stress,
        }
    }

    /// Load a save-state. The snapshot's width must match this field.
    pub fn restore(&mut self, snapshot: FieldSnapshot) -> bool {
        if snapshot.grid.width() != self.grid.width()
            || snapshot.grid.rows() != self.grid.rows()
        {
            return false;
        }
        self.grid = snapshot.grid;
        self.t_spin = snapshot.t_spin;
        self.mini_t_spin = snapshot.mini_t_spin;
        self.all_clear = snapshot.all_clear;
        self.blocks_being_added = snapshot.blocks_being_added;
        self.in_stress = snapshot.in_stress;
        true
    }

    /// Run the lock pipeline for a piece that can no longer fall
    pub fn lock_piece(&mut self, piece: &Piece, ctx: &mut LockContext<'_>) -> LockOutcome {
        for (x, y) in piece.block_positions() {
            self.grid.set(x, y, piece.kind);
        }

        let t_spin = self.detect_t_spin(piece);
        self.t_spin = t_spin == TSpin::Full;
        self.mini_t_spin = t_spin == TSpin::Mini;

        let rows = self.pattern_phase();
        self.animate_phase(&rows, piece.kind, ctx.animator);
        let non_garbage_lines = self.eliminate_phase(&rows);

        if !rows.is_empty() && self.grid.visible_is_empty() {
            self.all_clear = true;
            ctx.animator.explosion(CellArea {
                x: 0,
                y: self.grid.height(),
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }

        let report = ClearReport {
            lines_cleared: rows.len(),
            non_garbage_lines,
            t_spin,
            all_clear: self.all_clear,
        };
        ctx.scoreboard.report_lines_cleared(&report);

        self.in_stress = self.stress_check();
        ctx.scoreboard.report_stress(self.in_stress);

        let next_piece = self.generation_phase(ctx);

        debug!(
            kind = ?piece.kind,
            rows = ?rows,
            non_garbage_lines,
            t_spin = ?t_spin,
            all_clear = self.all_clear,
            in_stress = self.in_stress,
            "piece locked"
        );

        self.t_spin = false;
        self.mini_t_spin = false;
        self.all_clear = false;

        LockOutcome {
            report,
            cleared_rows: rows,
            in_stress: self.in_stress,
            next_piece,
        }
    }

    /// Full rows, top to bottom, buffer included
    fn pattern_phase(&self) -> Vec<usize> {
        self.grid.full_rows()
    }

    fn animate_phase(&self, rows: &[usize], kind: PieceKind, animator: &mut dyn Animator) {
        let center = (self.grid.width() as f32 - 1.0) / 2.0;
        for &row in rows {
            animator.row_flash(row, kind.color());
            for x in 0..self.grid.width() {
                let cell = self.grid.get(x as i32, row as i32);
                let velocity = ((x as f32 - center) * BURST_SPREAD, BURST_LIFT);
                animator.block_burst(x, row, velocity, cell.color());
            }
        }
        if rows.len() == TETRIS_ROWS {
            animator.screen_shake();
        }
    }

    /// Remove the marked rows in ascending order and count the ones that were
    /// not garbage. Removing a row only moves rows above it, so the
    /// remaining (larger) indices stay valid.
    fn eliminate_phase(&mut self, rows: &[usize]) -> usize {
        let mut non_garbage = 0;
        for &row in rows {
            let garbage = (0..2).any(|x| self.grid.get(x, row as i32) == PieceKind::Garbage);
            if !garbage {
                non_garbage += 1;
            }
            self.grid.clear_row(row);
        }
        non_garbage
    }

    /// Top fifth of the visible rows holds anything
    fn stress_check(&self) -> bool {
        let top = self.grid.height();
        let depth = (self.grid.height() / 5).max(1);
        (top..top + depth).any(|y| self.grid.is_row_occupied(y))
    }

    fn generation_phase(&mut self, ctx: &mut LockContext<'_>) -> Option<Piece> {
        let kind = ctx.pieces.request_next_piece();
        let piece = Piece::spawn(kind, &self.grid);
        if piece.is_obstructed(&self.grid) {
            info!(kind = ?kind, "spawn blocked, topped out");
            ctx.scoreboard.report_game_over();
            return None;
        }
        Some(piece)
    }

    /// Classify a lock. Only T pieces whose last action was a rotation count.
    /// Enough occupied pivot corners make a T-spin; it is a full one when the
    /// front corners are occupied too, or the last kick was used.
    fn detect_t_spin(&self, piece: &Piece) -> TSpin {
        if !piece.is_t_piece() || !piece.last_move_was_rotation() {
            return TSpin::None;
        }

        // Pivot is box cell (1, 1); corners clockwise from top-left
        let Position { x, y } = piece.position;
        let corners = [(x, y), (x + 2, y), (x + 2, y + 2), (x, y + 2)]
            .map(|(cx, cy)| self.grid.t_spin_check(cx, cy));
        let filled = corners.iter().filter(|&&c| c).count();
        if filled < self.t_spin_rule.corners {
            return TSpin::None;
        }

        let front = match piece.rotation {
            Rotation::North => [0, 1],
            Rotation::East => [1, 2],
            Rotation::South => [2, 3],
            Rotation::West => [3, 0],
        };
        let front_filled = front.iter().filter(|&&i| corners[i]).count();

        if front_filled >= self.t_spin_rule.front || piece.last_kick as usize == KICK_COUNT {
            TSpin::Full
        } else {
            TSpin::Mini
        }
    }
}
