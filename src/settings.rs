//! Game settings and tuning
//!
//! Loaded once at startup from an optional JSON file. Every field has a
//! default, so a partial file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::TICKS_PER_SECOND;
use crate::sim::BoostKind;

/// Errors raised while reading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Prices of the purchasable boosts, in coins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostPrices {
    pub speed: u32,
    pub jump: u32,
    pub shield: u32,
}

impl Default for BoostPrices {
    fn default() -> Self {
        Self {
            speed: 2,
            jump: 3,
            shield: 5,
        }
    }
}

impl BoostPrices {
    pub fn price(&self, kind: BoostKind) -> u32 {
        match kind {
            BoostKind::Speed => self.speed,
            BoostKind::Jump => self.jump,
            BoostKind::Shield => self.shield,
        }
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World seed (same seed + same inputs = same run)
    pub seed: u64,

    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Fraction of the remaining camera distance covered per tick
    pub camera_smoothing: f32,

    // === Avatar ===
    /// Horizontal speed (units/s)
    pub move_speed: f32,
    /// Initial jump velocity (units/s)
    pub jump_speed: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,

    // === World streaming ===
    /// Generated content kept ahead of the right viewport edge
    pub spawn_buffer: f32,
    /// Floor landings after a drop above this share of viewport height are lethal
    pub fall_death_fraction: f32,

    // === Shop ===
    pub prices: BoostPrices,
    pub speed_multiplier: f32,
    pub jump_multiplier: f32,
    pub boost_duration_secs: u32,

    // === HUD ===
    /// How long transient notices stay up (ticks)
    pub notice_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,

            viewport_width: 1400.0,
            viewport_height: 700.0,
            camera_smoothing: 0.15,

            move_speed: 900.0,
            jump_speed: 1500.0,
            gravity: 3240.0,

            spawn_buffer: 600.0,
            fall_death_fraction: 0.7,

            prices: BoostPrices::default(),
            speed_multiplier: 1.5,
            jump_multiplier: 1.4,
            boost_duration_secs: 15,

            notice_ticks: 60,
        }
    }
}

impl Settings {
    /// Settings with a specific seed and default tuning
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Drop height (world units) beyond which a floor landing kills
    pub fn fall_death_threshold(&self) -> f32 {
        (self.viewport_height * self.fall_death_fraction).floor()
    }

    /// Boost lifetime in simulation ticks
    pub fn boost_duration_ticks(&self) -> u64 {
        u64::from(self.boost_duration_secs) * TICKS_PER_SECOND
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}
