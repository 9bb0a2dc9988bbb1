//! One player's game: active piece, hold, gravity and lock delay
//!
//! Driven by a fixed-step loop. `tick` advances one frame; `process_action`
//! applies an input command. Either may run the lock pipeline and returns its
//! outcome when it does.

use crate::bag::{Bag, PREVIEW_LEN};
use crate::config::{Config, ConfigError, RulesConfig};
use crate::events::{Animator, Scoreboard};
use crate::field::{Field, LockContext, LockOutcome};
use crate::grid::Grid;
use crate::mode::{GameMode, ModeState};
use crate::piece::{Ghost, Piece};
use crate::score::Score;
use crate::tetromino::{PieceKind, RotationDirection};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Paused,
    GameOver,
    Victory,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
    Pause,
}

#[derive(Debug, Clone)]
pub struct Game {
    pub field: Field,
    pub current_piece: Option<Piece>,
    /// Held piece (can swap once per piece)
    pub hold_piece: Option<PieceKind>,
    hold_used: bool,
    bag: Bag,
    pub score: Score,
    pub state: GameState,
    pub mode_state: ModeState,
    rules: RulesConfig,
    /// Frames since the piece last fell
    gravity_timer: u32,
    /// Frames spent resting (Some while the piece touches ground)
    lock_timer: Option<u32>,
    lock_resets: u8,
    /// Lowest row reached (for lock reset tracking)
    lowest_row: i32,
    /// Soft drop distance this piece (for scoring)
    soft_drop_distance: u32,
    /// Outcome of the most recent lock
    pub last_lock: Option<LockOutcome>,
}

impl Game {
    pub fn new(config: &Config, seed: u64) -> Result<Self, ConfigError> {
        let field = Field::new(&config.field, &config.rules)?;
        let mut bag = Bag::with_seed(seed);
        let first_piece = Piece::spawn(bag.next(), field.grid());

        Ok(Self {
            field,
            current_piece: Some(first_piece),
            hold_piece: None,
            hold_used: false,
            bag,
            score: Score::new(config.rules.starting_level),
            state: GameState::Playing,
            mode_state: ModeState::new(config.mode),
            rules: config.rules.clone(),
            gravity_timer: 0,
            lock_timer: None,
            lock_resets: 0,
            lowest_row: i32::MIN,
            soft_drop_distance: 0,
            last_lock: None,
        })
    }

    pub fn mode(&self) -> GameMode {
        self.mode_state.mode
    }

    pub fn preview(&self) -> &[PieceKind] {
        self.bag.preview(PREVIEW_LEN)
    }

    /// Landing projection of the active piece
    pub fn ghost(&self) -> Option<Ghost> {
        self.current_piece
            .as_ref()
            .map(|piece| piece.ghost(self.field.grid()))
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver | GameState::Victory)
    }

    pub fn process_action(
        &mut self,
        action: Action,
        animator: &mut dyn Animator,
    ) -> Option<LockOutcome> {
        match self.state {
            GameState::Paused => {
                if action == Action::Pause {
                    self.state = GameState::Playing;
                }
                None
            }
            GameState::Playing => match action {
                Action::MoveLeft => {
                    self.shift(Piece::move_left);
                    None
                }
                Action::MoveRight => {
                    self.shift(Piece::move_right);
                    None
                }
                Action::SoftDrop => {
                    self.soft_drop();
                    None
                }
                Action::HardDrop => self.hard_drop(animator),
                Action::RotateCw => {
                    self.rotate(RotationDirection::Clockwise);
                    None
                }
                Action::RotateCcw => {
                    self.rotate(RotationDirection::CounterClockwise);
                    None
                }
                Action::Hold => {
                    self.hold();
                    None
                }
                Action::Pause => {
                    self.state = GameState::Paused;
                    None
                }
            },
            GameState::GameOver | GameState::Victory => None,
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, animator: &mut dyn Animator) -> Option<LockOutcome> {
        if self.state != GameState::Playing {
            return None;
        }

        self.mode_state.update();
        if self.mode_state.is_complete(self.score.lines) {
            info!(
                mode = self.mode().name(),
                time = %self.mode_state.format_time(),
                "mode complete"
            );
            self.state = GameState::Victory;
            return None;
        }

        let on_ground = self.current_piece.as_ref()?.on_ground(self.field.grid());

        if on_ground {
            self.gravity_timer = 0;
            let elapsed = self.lock_timer.map_or(1, |t| t + 1);
            self.lock_timer = Some(elapsed);
            if elapsed >= self.rules.lock_delay_frames {
                return self.lock_piece(animator);
            }
        } else {
            self.lock_timer = None;
            self.gravity_timer += 1;
            if self.gravity_timer >= self.score.gravity_frames(self.rules.gravity_multiplier) {
                if let Some(piece) = &mut self.current_piece {
                    piece.move_down(self.field.grid());
                }
                self.gravity_timer = 0;
            }
        }
        None
    }

    fn shift(&mut self, step: fn(&mut Piece, &Grid) -> bool) {
        if let Some(piece) = &mut self.current_piece {
            if step(piece, self.field.grid()) {
                self.try_reset_lock();
            }
        }
    }

    fn soft_drop(&mut self) {
        if let Some(piece) = &mut self.current_piece {
            if piece.move_down(self.field.grid()) {
                self.soft_drop_distance += 1;
                self.gravity_timer = 0;
                self.lock_timer = None;
            }
        }
    }

    fn hard_drop(&mut self, animator: &mut dyn Animator) -> Option<LockOutcome> {
        let piece = self.current_piece.as_mut()?;
        let distance = piece.hard_drop(self.field.grid());
        self.score.add_hard_drop(distance);
        self.lock_piece(animator)
    }

    fn rotate(&mut self, direction: RotationDirection) {
        if let Some(piece) = &mut self.current_piece {
            if piece.rotate(direction, self.field.grid()) {
                self.try_reset_lock();
            }
        }
    }

    fn hold(&mut self) {
        if self.hold_used {
            return;
        }

        let Some(current) = self.current_piece.take() else {
            return;
        };

        let next_kind = match self.hold_piece.replace(current.kind) {
            Some(held) => held,
            None => self.bag.next(),
        };
        let next_piece = Piece::spawn(next_kind, self.field.grid());

        if next_piece.is_obstructed(self.field.grid()) {
            self.top_out();
            return;
        }

        self.current_piece = Some(next_piece);
        self.reset_piece_state();
        self.hold_used = true;
    }

    /// Refresh lock delay after a successful move (limited resets per piece)
    fn try_reset_lock(&mut self) {
        let Some(piece) = &self.current_piece else {
            return;
        };
        // Rows grow downward, so a larger row is lower
        if piece.position.y > self.lowest_row {
            self.lowest_row = piece.position.y;
            self.lock_resets = 0;
        }

        if self.lock_resets < self.rules.max_lock_resets && self.lock_timer.is_some() {
            self.lock_timer = Some(0);
            self.lock_resets += 1;
        }
    }

    /// Lock the current piece and take the next one from the pipeline
    fn lock_piece(&mut self, animator: &mut dyn Animator) -> Option<LockOutcome> {
        let piece = self.current_piece.take()?;

        self.score.add_soft_drop(self.soft_drop_distance);

        // Lock out: the whole piece came to rest above the visible area
        let grid = self.field.grid();
        let locked_out = piece
            .block_positions()
            .iter()
            .all(|&(_, y)| y < 0 || !grid.is_visible_row(y as usize));

        let mut ctx = LockContext {
            animator,
            scoreboard: &mut self.score,
            pieces: &mut self.bag,
        };
        let outcome = self.field.lock_piece(&piece, &mut ctx);

        if outcome.topped_out() || (locked_out && outcome.report.lines_cleared == 0) {
            self.top_out();
        } else {
            self.current_piece = outcome.next_piece.clone();
            self.reset_piece_state();
        }

        self.last_lock = Some(outcome.clone());
        Some(outcome)
    }

    /// End the game because the stack reached the spawn area
    pub fn top_out(&mut self) {
        if self.state == GameState::GameOver {
            return;
        }
        info!(points = self.score.points, lines = self.score.lines, "game over");
        self.current_piece = None;
        self.state = GameState::GameOver;
        if !self.score.game_over {
            self.score.report_game_over();
        }
    }

    /// After the grid changed underneath the active piece (garbage pushed
    /// in), end the game if the piece now overlaps the stack.
    pub fn revalidate_piece(&mut self) {
        let obstructed = self
            .current_piece
            .as_ref()
            .is_some_and(|piece| piece.is_obstructed(self.field.grid()));
        if obstructed {
            self.top_out();
        }
    }

    fn reset_piece_state(&mut self) {
        self.hold_used = false;
        self.gravity_timer = 0;
        self.lock_timer = None;
        self.lock_resets = 0;
        self.lowest_row = i32::MIN;
        self.soft_drop_distance = 0;
    }
}
