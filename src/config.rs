//! Match configuration loaded from TOML
//!
//! Every section falls back to its defaults, so a partial file such as
//! `[garbage]\nmultiplier = 1.5` is valid. Values are checked once, before
//! any field is built.

use crate::grid::{MAX_WIDTH, MIN_WIDTH};
use crate::mode::GameMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete configuration for one game or versus match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Seed for the bags and garbage gaps; random when absent
    pub seed: Option<u64>,
    pub mode: GameMode,
    pub field: FieldConfig,
    pub rules: RulesConfig,
    pub garbage: GarbageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Columns, 4 to 12
    pub width: usize,
}

/// Timing and classification rules for a single player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Frames a resting piece waits before locking
    pub lock_delay_frames: u32,
    /// Lock delay resets allowed per piece
    pub max_lock_resets: u8,
    /// Scales gravity speed (0.1 to 5.0)
    pub gravity_multiplier: f64,
    /// 1 to 15
    pub starting_level: u32,
    /// Occupied pivot corners needed for any T-spin
    pub t_spin_corner_threshold: u8,
    /// Occupied front corners needed to upgrade a mini T-spin to a full one
    pub t_spin_front_corners: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarbageConfig {
    /// Applied to attack lines, result floored
    pub multiplier: f64,
    /// Maximum rows waiting in one player's queue
    pub queue_cap: usize,
    /// Maximum rows injected per lock
    pub injection_cap: usize,
    pub attack: AttackTable,
}

/// How a clear is turned into attack lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackTable {
    /// One attack line per cleared non-garbage row
    #[default]
    Lines,
    /// Guideline table with T-spin, back-to-back and combo bonuses
    Guideline,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: crate::grid::DEFAULT_WIDTH,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            lock_delay_frames: 30,
            max_lock_resets: 15,
            gravity_multiplier: 1.0,
            starting_level: 1,
            t_spin_corner_threshold: 3,
            t_spin_front_corners: 2,
        }
    }
}

impl Default for GarbageConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            queue_cap: 20,
            injection_cap: 8,
            attack: AttackTable::Lines,
        }
    }
}

/// Rejected configuration
#[derive(Debug)]
pub enum ConfigError {
    WidthOutOfRange(usize),
    InvalidGravity(f64),
    InvalidGarbageMultiplier(f64),
    StartingLevelOutOfRange(u32),
    CornerThreshold { corners: u8, front: u8 },
    ZeroCap(&'static str),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WidthOutOfRange(width) => write!(
                f,
                "field width {} is outside {}..={}",
                width, MIN_WIDTH, MAX_WIDTH
            ),
            ConfigError::InvalidGravity(value) => {
                write!(f, "gravity multiplier {} is outside 0.1..=5.0", value)
            }
            ConfigError::InvalidGarbageMultiplier(value) => {
                write!(f, "garbage multiplier {} must be finite and not negative", value)
            }
            ConfigError::StartingLevelOutOfRange(level) => {
                write!(f, "starting level {} is outside 1..=15", level)
            }
            ConfigError::CornerThreshold { corners, front } => write!(
                f,
                "T-spin thresholds must satisfy front ({}) <= 2 and corners ({}) <= 4",
                front, corners
            ),
            ConfigError::ZeroCap(name) => write!(f, "{} must be at least 1", name),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.rules.validate()?;
        self.garbage.validate()
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::WidthOutOfRange(self.width));
        }
        Ok(())
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.1..=5.0).contains(&self.gravity_multiplier) {
            return Err(ConfigError::InvalidGravity(self.gravity_multiplier));
        }
        if !(1..=15).contains(&self.starting_level) {
            return Err(ConfigError::StartingLevelOutOfRange(self.starting_level));
        }
        if self.t_spin_corner_threshold > 4 || self.t_spin_front_corners > 2 {
            return Err(ConfigError::CornerThreshold {
                corners: self.t_spin_corner_threshold,
                front: self.t_spin_front_corners,
            });
        }
        if self.lock_delay_frames == 0 {
            return Err(ConfigError::ZeroCap("lock_delay_frames"));
        }
        Ok(())
    }
}

impl GarbageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(ConfigError::InvalidGarbageMultiplier(self.multiplier));
        }
        if self.queue_cap == 0 {
            return Err(ConfigError::ZeroCap("queue_cap"));
        }
        if self.injection_cap == 0 {
            return Err(ConfigError::ZeroCap("injection_cap"));
        }
        Ok(())
    }
}
