//! tetrs-sim - run a headless versus match
//!
//! Two random input drivers play a seeded match. Logs go to a file in the
//! temp dir; the match summary is printed to stdout as JSON.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tetrs_core::events::CellArea;
use tetrs_core::garbage::PLAYERS;
use tetrs_core::tetromino::Rgb;
use tetrs_core::{Action, Animator, Config, VersusMatch};
use tracing::{info, trace};

/// Stop after 10 minutes of simulated play
const MAX_FRAMES: u64 = 60 * 60 * 10;

/// Frames between driver inputs
const INPUT_INTERVAL: u64 = 4;

/// Get the tetrs temp directory, creating it if needed
fn tetrs_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tetrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Presentation requests go to the trace log
struct LoggingAnimator;

impl Animator for LoggingAnimator {
    fn row_flash(&mut self, row: usize, color: Rgb) {
        trace!(row, ?color, "row flash");
    }

    fn explosion(&mut self, area: CellArea) {
        trace!(?area, "explosion");
    }

    fn screen_shake(&mut self) {
        trace!("screen shake");
    }
}

/// Mashes buttons, but drops pieces often enough to make progress
struct RandomDriver {
    rng: ChaCha8Rng,
}

impl RandomDriver {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn next_action(&mut self) -> Action {
        match self.rng.gen_range(0..10) {
            0 | 1 => Action::MoveLeft,
            2 | 3 => Action::MoveRight,
            4 => Action::RotateCw,
            5 => Action::RotateCcw,
            6 => Action::SoftDrop,
            7 => Action::Hold,
            _ => Action::HardDrop,
        }
    }
}

fn load_config() -> Result<Config> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(Config::default());
    };
    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    Config::from_toml_str(&contents).with_context(|| format!("parsing config {path}"))
}

fn main() -> Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let tetrs_dir = tetrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&tetrs_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tetrs_core=debug".parse()?)
                .add_directive("tetrs_sim=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    info!(
        "tetrs-sim starting up, session={:08x}, log={}",
        session_id,
        tetrs_dir.join(&log_file).display()
    );

    let config = load_config()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut versus = VersusMatch::new(&config, seed).context("invalid configuration")?;

    let mut drivers: Vec<RandomDriver> = (0..PLAYERS)
        .map(|id| RandomDriver::new(seed.wrapping_add(id as u64 + 1)))
        .collect();
    let mut animator = LoggingAnimator;

    while !versus.is_finished() && versus.frames() < MAX_FRAMES {
        if versus.frames() % INPUT_INTERVAL == 0 {
            for (id, driver) in drivers.iter_mut().enumerate() {
                let action = driver.next_action();
                if let Some(transfer) = versus.apply(id, action, &mut animator) {
                    if transfer.sent > 0 {
                        info!(player = id, sent = transfer.sent, "attack");
                    }
                }
            }
        }
        versus.tick(&mut animator);
    }

    let summary = versus.summary();
    info!(winner = ?summary.winner, frames = summary.frames, "simulation finished");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
