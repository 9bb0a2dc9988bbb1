//! Garbage exchange between the two versus players
//!
//! Each player has a queue of incoming garbage rows. Clearing lines first
//! cancels the clearer's own incoming rows, the rest is sent to the opponent.
//! Queued rows are pushed into a field whenever its owner locks a piece.

use crate::config::{AttackTable, GarbageConfig};
use crate::field::{ClearReport, TSpin};
use crate::grid::{Grid, Row};
use crate::tetromino::PieceKind;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

pub type PlayerId = usize;

pub const PLAYERS: usize = 2;

pub fn opponent(player: PlayerId) -> PlayerId {
    (player + 1) % PLAYERS
}

/// Where the rows of one clear went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GarbageTransfer {
    /// Rows after the multiplier
    pub attack: usize,
    /// Own incoming rows cancelled
    pub canceled: usize,
    /// Rows queued for the opponent
    pub sent: usize,
    /// Rows lost to the queue cap
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct GarbageExchange {
    queues: [Vec<Row>; PLAYERS],
    width: usize,
    multiplier: f64,
    queue_cap: usize,
    injection_cap: usize,
    rng: ChaCha8Rng,
}

impl GarbageExchange {
    pub fn new(width: usize, config: &GarbageConfig, seed: u64) -> Self {
        Self {
            queues: [Vec::new(), Vec::new()],
            width,
            multiplier: config.multiplier,
            queue_cap: config.queue_cap,
            injection_cap: config.injection_cap,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rows waiting to be pushed into `player`'s field
    pub fn pending(&self, player: PlayerId) -> usize {
        self.queues[player].len()
    }

    pub fn queue(&self, player: PlayerId) -> &[Row] {
        &self.queues[player]
    }

    /// Settle a clear by `source`. `adjusted_lines` is the attack before the
    /// multiplier; zero leaves both queues alone.
    pub fn on_lines_cleared(
        &mut self,
        lines_cleared: usize,
        adjusted_lines: usize,
        source: PlayerId,
    ) -> GarbageTransfer {
        let attack = (adjusted_lines as f64 * self.multiplier).floor() as usize;
        if attack == 0 {
            return GarbageTransfer::default();
        }

        // Every row of one attack shares the same gap
        let template = self.garbage_row();

        let own = &mut self.queues[source];
        let canceled = attack.min(own.len());
        own.truncate(own.len() - canceled);

        let target = &mut self.queues[opponent(source)];
        let remaining = attack - canceled;
        let room = self.queue_cap.saturating_sub(target.len());
        let sent = remaining.min(room);
        let dropped = remaining - sent;
        target.extend(std::iter::repeat_n(template, sent));

        debug!(
            source,
            lines_cleared,
            adjusted_lines,
            attack,
            canceled,
            sent,
            "garbage settled"
        );
        if dropped > 0 {
            warn!(target = opponent(source), dropped, "garbage queue full");
        }

        GarbageTransfer {
            attack,
            canceled,
            sent,
            dropped,
        }
    }

    /// Push up to the injection cap of `player`'s queued rows into their
    /// grid, newest first. Returns how many rows went in.
    pub fn on_piece_locked(&mut self, player: PlayerId, grid: &mut Grid) -> usize {
        let queue = &mut self.queues[player];
        let count = queue.len().min(self.injection_cap);
        if count == 0 {
            return 0;
        }
        let rows: Vec<Row> = (0..count).filter_map(|_| queue.pop()).collect();
        grid.push_up(rows);
        debug!(player, count, left = queue.len(), "garbage pushed in");
        count
    }

    /// A full garbage row with one random gap
    fn garbage_row(&mut self) -> Row {
        let gap = self.rng.gen_range(0..self.width);
        (0..self.width)
            .map(|x| {
                if x == gap {
                    PieceKind::None
                } else {
                    PieceKind::Garbage
                }
            })
            .collect()
    }
}

/// Attack before the multiplier for one clear
pub fn attack_lines(
    table: AttackTable,
    report: &ClearReport,
    combo: i32,
    back_to_back: bool,
) -> usize {
    match table {
        AttackTable::Lines => report.non_garbage_lines,
        AttackTable::Guideline => {
            if report.non_garbage_lines == 0 {
                return 0;
            }
            guideline_garbage(
                report.non_garbage_lines,
                report.t_spin != TSpin::None,
                combo.max(0) as usize,
                back_to_back,
            )
        }
    }
}

/// Guideline attack: base by clear, +1 back-to-back, +combo, capped at 12
fn guideline_garbage(lines: usize, is_tspin: bool, combo: usize, back_to_back: bool) -> usize {
    let base = if is_tspin {
        match lines {
            1 => 2,
            2 => 4,
            3 => 6,
            _ => 0,
        }
    } else {
        match lines {
            1 => 0,
            2 => 1,
            3 => 2,
            4 => 4,
            _ => 0,
        }
    };

    let b2b_bonus = if back_to_back && (lines == 4 || is_tspin) { 1 } else { 0 };
    let combo_bonus = combo.min(10);

    (base + b2b_bonus + combo_bonus).min(12)
}
