//! TETRS core - field, lock pipeline and versus garbage exchange
//!
//! The simulation runs on a fixed 60 fps step with no rendering, audio or
//! input devices attached. Presentation hooks are the `Animator`,
//! `Scoreboard` and `PieceSource` traits in [`events`].

pub mod bag;
pub mod collision;
pub mod config;
pub mod events;
pub mod field;
pub mod game;
pub mod garbage;
pub mod grid;
pub mod mode;
pub mod piece;
pub mod score;
pub mod srs;
pub mod tetromino;
pub mod versus;

pub use config::{Config, ConfigError};
pub use events::{Animator, PieceSource, Quiet, Scoreboard};
pub use field::{ClearReport, Field, FieldSnapshot, LockContext, LockOutcome, TSpin};
pub use game::{Action, Game, GameState};
pub use garbage::{GarbageExchange, GarbageTransfer, PlayerId};
pub use grid::Grid;
pub use piece::Piece;
pub use tetromino::PieceKind;
pub use versus::{MatchSummary, VersusMatch};
