//! Two-player versus match on one machine
//!
//! Both players draw from bags with the same seed. After every lock the
//! clear is settled with the garbage exchange, queued garbage is pushed into
//! the locking player's field, and the match checks for a winner.

use crate::config::{AttackTable, Config, ConfigError};
use crate::events::Animator;
use crate::field::{FieldSnapshot, LockOutcome};
use crate::game::{Action, Game, GameState};
use crate::garbage::{
    GarbageExchange, GarbageTransfer, PLAYERS, PlayerId, attack_lines, opponent,
};
use serde::Serialize;
use tracing::info;

/// Keeps the garbage gaps independent from the piece order
const GARBAGE_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone)]
pub struct VersusMatch {
    players: [Game; PLAYERS],
    exchange: GarbageExchange,
    attack: AttackTable,
    seed: u64,
    frames: u64,
    finished: bool,
    winner: Option<PlayerId>,
}

/// End-of-match numbers for one player
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub points: u64,
    pub lines: u32,
    pub level: u32,
    pub pending_garbage: usize,
    pub topped_out: bool,
    pub field: FieldSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub frames: u64,
    pub finished: bool,
    pub winner: Option<PlayerId>,
    pub players: Vec<PlayerSummary>,
}

impl VersusMatch {
    pub fn new(config: &Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let players = [Game::new(config, seed)?, Game::new(config, seed)?];
        let exchange = GarbageExchange::new(
            config.field.width,
            &config.garbage,
            seed ^ GARBAGE_SEED_SALT,
        );
        info!(seed, attack = ?config.garbage.attack, "versus match started");

        Ok(Self {
            players,
            exchange,
            attack: config.garbage.attack,
            seed,
            frames: 0,
            finished: false,
            winner: None,
        })
    }

    pub fn player(&self, id: PlayerId) -> &Game {
        &self.players[id]
    }

    pub fn exchange(&self) -> &GarbageExchange {
        &self.exchange
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Apply one player's input. Returns the garbage settled if it locked.
    pub fn apply(
        &mut self,
        player: PlayerId,
        action: Action,
        animator: &mut dyn Animator,
    ) -> Option<GarbageTransfer> {
        if self.finished {
            return None;
        }
        let back_to_back = self.players[player].score.back_to_back;
        let outcome = self.players[player].process_action(action, animator);
        let transfer = outcome.map(|outcome| self.settle(player, &outcome, back_to_back));
        // Hold can top out without a lock
        self.check_winner();
        transfer
    }

    /// Advance one player by a frame
    pub fn tick_player(
        &mut self,
        player: PlayerId,
        animator: &mut dyn Animator,
    ) -> Option<GarbageTransfer> {
        if self.finished {
            return None;
        }
        let transfer = self.step(player, animator);
        self.check_winner();
        transfer
    }

    /// Advance both players by a frame. Both step before the result is
    /// decided, so players ending on the same frame draw.
    pub fn tick(&mut self, animator: &mut dyn Animator) {
        if self.finished {
            return;
        }
        self.frames += 1;
        for player in 0..PLAYERS {
            if !self.players[player].is_over() {
                self.step(player, animator);
            }
        }
        self.check_winner();
    }

    fn step(
        &mut self,
        player: PlayerId,
        animator: &mut dyn Animator,
    ) -> Option<GarbageTransfer> {
        let back_to_back = self.players[player].score.back_to_back;
        let outcome = self.players[player].tick(animator)?;
        Some(self.settle(player, &outcome, back_to_back))
    }

    /// Route one lock through the exchange. `back_to_back` is the streak as
    /// it stood before this lock.
    fn settle(
        &mut self,
        player: PlayerId,
        outcome: &LockOutcome,
        back_to_back: bool,
    ) -> GarbageTransfer {
        let adjusted = attack_lines(
            self.attack,
            &outcome.report,
            self.players[player].score.combo,
            back_to_back,
        );
        let transfer = self
            .exchange
            .on_lines_cleared(outcome.report.lines_cleared, adjusted, player);
        self.sync_pending();

        if !self.players[player].is_over() {
            let game = &mut self.players[player];
            let injected = self.exchange.on_piece_locked(player, game.field.grid_mut());
            if injected > 0 {
                game.revalidate_piece();
            }
            self.sync_pending();
        }

        transfer
    }

    fn sync_pending(&mut self) {
        for (id, game) in self.players.iter_mut().enumerate() {
            game.field.blocks_being_added = self.exchange.pending(id);
        }
    }

    /// End the match once a player has topped out or finished their mode.
    /// A single top-out hands the win to the other player. Two players
    /// ending together draw.
    fn check_winner(&mut self) {
        if self.finished {
            return;
        }
        let lost: Vec<PlayerId> = (0..PLAYERS)
            .filter(|&id| self.players[id].state == GameState::GameOver)
            .collect();
        let won: Vec<PlayerId> = (0..PLAYERS)
            .filter(|&id| self.players[id].state == GameState::Victory)
            .collect();

        let winner = match (lost.as_slice(), won.as_slice()) {
            ([], []) => return,
            ([loser], _) => Some(opponent(*loser)),
            ([], [id]) => Some(*id),
            _ => None,
        };

        self.finished = true;
        self.winner = winner;
        match winner {
            Some(id) => {
                self.players[id].state = GameState::Victory;
                info!(winner = id, frames = self.frames, "versus match over");
            }
            None => info!(frames = self.frames, "versus match drawn"),
        }
    }

    pub fn summary(&self) -> MatchSummary {
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(id, game)| PlayerSummary {
                points: game.score.points,
                lines: game.score.lines,
                level: game.score.level,
                pending_garbage: self.exchange.pending(id),
                topped_out: game.state == GameState::GameOver,
                field: game.field.snapshot(),
            })
            .collect();

        MatchSummary {
            seed: self.seed,
            frames: self.frames,
            finished: self.finished,
            winner: self.winner,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Quiet;
    use crate::mode::GameMode;
    use crate::piece::Piece;
    use crate::tetromino::{PieceKind, RotationDirection};

    fn versus() -> VersusMatch {
        let config = Config {
            mode: GameMode::Versus,
            ..Config::default()
        };
        VersusMatch::new(&config, 11).unwrap()
    }

    /// Fill the bottom `rows` of a player's grid except column 0, and give
    /// them a vertical I piece over that column.
    fn rig_well(game: &mut Game, rows: usize) {
        let grid = game.field.grid_mut();
        let bottom = grid.rows();
        for y in bottom - rows..bottom {
            for x in 1..grid.width() {
                grid.set(x as i32, y as i32, PieceKind::Block);
            }
        }
        let mut piece = Piece::spawn(PieceKind::Line, game.field.grid());
        piece.rotate(RotationDirection::Clockwise, game.field.grid());
        while piece.move_left(game.field.grid()) {}
        game.current_piece = Some(piece);
    }

    #[test]
    fn test_players_share_piece_order() {
        let game = versus();
        assert_eq!(
            game.player(0).current_piece.as_ref().map(|p| p.kind),
            game.player(1).current_piece.as_ref().map(|p| p.kind)
        );
        assert_eq!(game.player(0).preview(), game.player(1).preview());
    }

    #[test]
    fn test_tetris_sends_garbage() {
        let mut game = versus();
        rig_well(&mut game.players[0], 4);

        let transfer = game.apply(0, Action::HardDrop, &mut Quiet).unwrap();
        assert_eq!(transfer.sent, 4);
        assert_eq!(game.exchange().pending(1), 4);
        assert_eq!(game.player(1).field.blocks_being_added, 4);
        assert!(!game.is_finished());

        // Player 1's next lock pushes the rows in
        game.apply(1, Action::HardDrop, &mut Quiet);
        assert_eq!(game.exchange().pending(1), 0);
        assert_eq!(game.player(1).field.blocks_being_added, 0);
        let grid = game.player(1).field.grid();
        let bottom = grid.rows() - 1;
        assert!(grid.row(bottom).unwrap().contains(&PieceKind::Garbage));
    }

    #[test]
    fn test_top_out_ends_match() {
        let mut game = versus();
        for _ in 0..200 {
            if game.is_finished() {
                break;
            }
            game.apply(1, Action::HardDrop, &mut Quiet);
        }
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(0));
        assert_eq!(game.player(0).state, GameState::Victory);

        // Finished matches ignore input
        assert!(game.apply(0, Action::HardDrop, &mut Quiet).is_none());
    }

    #[test]
    fn test_summary_serializes() {
        let mut game = versus();
        for _ in 0..10 {
            game.tick(&mut Quiet);
        }
        let summary = game.summary();
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.players.len(), PLAYERS);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"winner\":null"));
    }

    #[test]
    fn test_hold_into_blocked_spawn_ends_match() {
        let mut game = versus();
        // Every spawn shape covers this cell
        game.players[0]
            .field
            .grid_mut()
            .set(4, 19, PieceKind::Garbage);

        assert!(game.apply(0, Action::Hold, &mut Quiet).is_none());
        assert_eq!(game.player(0).state, GameState::GameOver);
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(1));
        assert_eq!(game.player(1).state, GameState::Victory);
    }

    fn sprint() -> VersusMatch {
        let config = Config {
            mode: GameMode::Sprint,
            ..Config::default()
        };
        VersusMatch::new(&config, 5).unwrap()
    }

    #[test]
    fn test_mode_finish_wins_without_a_lock() {
        let mut game = sprint();
        game.players[1].score.lines = 40;
        game.tick(&mut Quiet);
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(1));
        assert_eq!(game.player(0).state, GameState::Playing);
    }

    #[test]
    fn test_finishing_on_the_same_frame_draws() {
        let mut game = sprint();
        game.players[0].score.lines = 40;
        game.players[1].score.lines = 40;
        game.tick(&mut Quiet);
        assert!(game.is_finished());
        assert_eq!(game.winner(), None);
        assert!(game.summary().finished);
    }
}
