//! Headless runner settings
//!
//! Loaded from an optional JSON file; every field falls back to its default
//! when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// How the runner drives the cursor the hero follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CursorPattern {
    /// Stay at the bottom center
    Fixed,
    /// Seeded random walk along the bottom of the play area
    #[default]
    Wander,
    /// Sweep left and right at a constant rate
    Sweep,
}

impl CursorPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            CursorPattern::Fixed => "Fixed",
            CursorPattern::Wander => "Wander",
            CursorPattern::Sweep => "Sweep",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" => Some(CursorPattern::Fixed),
            "wander" | "random" => Some(CursorPattern::Wander),
            "sweep" => Some(CursorPattern::Sweep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed simulation rate (ticks per second)
    pub sim_hz: u32,
    /// Simulated seconds to run
    pub duration_secs: f32,
    /// Seed for the cursor generator
    pub seed: u64,
    /// Content file (`.json` or binary); the built-in demo when unset
    pub content_path: Option<String>,

    // === Cursor ===
    pub cursor: CursorPattern,
    /// Maximum cursor travel per second (world units)
    pub cursor_wander: f32,
    /// Cursor height in world units
    pub cursor_y: f32,

    /// `env_logger` filter; `RUST_LOG` takes precedence
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim_hz: 60,
            duration_secs: 60.0,
            seed: 0x5eed,
            content_path: None,

            cursor: CursorPattern::Wander,
            cursor_wander: 4.0,
            cursor_y: -6.0,

            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sim_hz == 0 {
            return Err(SettingsError::InvalidRate(self.sim_hz));
        }
        Ok(())
    }

    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.sim_hz.max(1) as f32
    }

    /// Ticks needed to cover `duration_secs`
    pub fn total_ticks(&self) -> u64 {
        let secs = self.duration_secs.max(0.0) as f64;
        (secs * self.sim_hz as f64).round() as u64
    }
}
