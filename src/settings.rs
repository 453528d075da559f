//! Arena and gameplay settings
//!
//! Loaded from JSON (file or string); every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::GameMode;

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Arena width in pixels
    pub width: f32,
    /// Arena height in pixels
    pub height: f32,
    /// Lives at the start of a game
    pub starting_lives: u32,
    /// Maximum live bullets
    pub max_bullets: usize,
    /// Bullet muzzle speed (px/s), added to ship velocity
    pub bullet_speed: f32,
    /// Bullet lifetime (ms)
    pub bullet_lifetime_ms: f32,
    /// Total spread of initial asteroid velocity per axis (px/s)
    pub asteroid_speed: f32,
    /// Delay between shots (ms)
    pub shoot_delay_ms: f32,
    /// Variant used by a fresh game
    pub default_mode: GameMode,
    /// Force bullets to wrap (`Some(true)`) or despawn off-arena
    /// (`Some(false)`); `None` follows the mode
    pub bullet_wrap: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        let bullet_speed = 500.0;
        // Bullets cover roughly three quarters of the arena width
        let bullet_lifetime_ms = ((ARENA_WIDTH * 0.75 / bullet_speed) * 1000.0).floor();
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            starting_lives: 3,
            max_bullets: 10,
            bullet_speed,
            bullet_lifetime_ms,
            asteroid_speed: 100.0,
            shoot_delay_ms: 200.0,
            default_mode: GameMode::Enhanced,
            bullet_wrap: None,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(field: &'static str, v: f32) -> Result<(), SettingsError> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive finite number",
                })
            }
        }

        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("bullet_speed", self.bullet_speed)?;
        positive("bullet_lifetime_ms", self.bullet_lifetime_ms)?;
        if !self.asteroid_speed.is_finite() || self.asteroid_speed < 0.0 {
            return Err(SettingsError::Invalid {
                field: "asteroid_speed",
                reason: "must be zero or a positive finite number",
            });
        }
        if !self.shoot_delay_ms.is_finite() || self.shoot_delay_ms < 0.0 {
            return Err(SettingsError::Invalid {
                field: "shoot_delay_ms",
                reason: "must be zero or a positive finite number",
            });
        }
        if self.max_bullets == 0 {
            return Err(SettingsError::Invalid {
                field: "max_bullets",
                reason: "must allow at least one bullet",
            });
        }
        if self.starting_lives == 0 {
            return Err(SettingsError::Invalid {
                field: "starting_lives",
                reason: "must be at least one",
            });
        }
        Ok(())
    }

    /// Whether bullets wrap at the arena edges under `mode`
    pub fn bullets_wrap(&self, mode: GameMode) -> bool {
        self.bullet_wrap.unwrap_or(mode == GameMode::Enhanced)
    }

    /// Arena center
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}
