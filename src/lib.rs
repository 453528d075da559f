//! Asteroids - a wraparound arena arcade simulation
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, spawning, respawn, game state)
//! - `game`: Driver-facing orchestrator (input, pause/restart, snapshots)
//! - `settings`: Arena and gameplay configuration

pub mod game;
pub mod settings;
pub mod sim;

pub use game::{Game, InputState};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Longest frame the simulation will integrate in one call (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Arena defaults
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Ship
    pub const PLAYER_RADIUS: f32 = 15.0;
    /// Velocity added along the heading per thrusting tick (px/s)
    pub const PLAYER_THRUST: f32 = 30.0;
    pub const PLAYER_MAX_SPEED: f32 = 300.0;
    /// Flat per-tick velocity multiplier (not time scaled)
    pub const PLAYER_FRICTION: f32 = 0.98;
    pub const PLAYER_ROTATION_SPEED: f32 = 3.6; // rad/s
    /// Distance from ship center to nose, where bullets appear
    pub const SHIP_NOSE_DISTANCE: f32 = 15.0;
    pub const EXHAUST_INTERVAL_MS: f32 = 90.0;
    pub const EXHAUST_REAR_DISTANCE: f32 = 12.0;
    pub const EXHAUST_LIFETIME_MS: f32 = 140.0;

    /// Bullets
    pub const BULLET_RADIUS: f32 = 3.0;

    /// Asteroids
    pub const ASTEROID_MIN_SIZE: f32 = 40.0;
    pub const ASTEROID_SIZE_SPREAD: f32 = 20.0;
    /// Asteroids at or below this size do not split
    pub const ASTEROID_SPLIT_MIN_SIZE: f32 = 20.0;
    pub const ASTEROID_SCORE_PER_SIZE: f32 = 10.0;
    pub const SPLIT_POSITION_JITTER: f32 = 20.0; // total spread, ±10
    pub const SPLIT_VELOCITY_JITTER: f32 = 50.0; // total spread, ±25
    pub const ASTEROID_MAX_SPIN: f32 = 1.2; // total spread, rad/s
    pub const WAVE_BASE_ASTEROIDS: u32 = 3;
    pub const WAVE_PLAYER_CLEARANCE: f32 = 220.0;
    pub const WAVE_OVERLAP_PADDING: f32 = 20.0;
    pub const WAVE_PLACEMENT_TRIES: u32 = 200;

    /// Saucers
    pub const SAUCER_RADIUS: f32 = 14.0;
    pub const SAUCER_SCORE: u64 = 250;
    pub const SAUCER_ENTRY_OFFSET: f32 = 30.0;
    pub const SAUCER_OFFSCREEN_MARGIN: f32 = 40.0;
    pub const SAUCER_MIN_SPEED: f32 = 80.0;
    pub const SAUCER_SPEED_SPREAD: f32 = 60.0;
    pub const SAUCER_DRIFT: f32 = 20.0; // total spread, ±10
    pub const SAUCER_LANE_MARGIN: f32 = 60.0;

    /// Saucer scheduling (ms)
    pub const SAUCER_FIRST_DELAY: f32 = 8000.0;
    pub const SAUCER_FIRST_SPREAD: f32 = 6000.0;
    pub const SAUCER_LEVEL_ACCEL: f32 = 500.0;
    pub const SAUCER_MAX_ACCEL: f32 = 3000.0;
    pub const SAUCER_MIN_DELAY: f32 = 3000.0;
    pub const SAUCER_MIN_GAP: f32 = 12000.0;
    pub const SAUCER_MAX_GAP: f32 = 20000.0;

    /// Particles
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const PARTICLE_SHRINK: f32 = 0.98;
    pub const PARTICLE_SPEED_SPREAD: f32 = 200.0;
    /// Explosion size used for ship and saucer deaths
    pub const SHIP_EXPLOSION_SIZE: f32 = 30.0;

    /// Respawn (ms)
    pub const RESPAWN_DELAY_MS: f32 = 1200.0;
    pub const RESPAWN_RETRY_MS: f32 = 300.0;
    pub const INVULNERABLE_TRADITIONAL_MS: f32 = 1500.0;
    pub const INVULNERABLE_ENHANCED_MS: f32 = 1800.0;
    pub const BLINK_INTERVAL_MS: f32 = 120.0;
    pub const SAFE_RADIUS: f32 = 120.0;
    pub const SAFE_HORIZON_MS: f32 = 2000.0;
    pub const SAFE_PREDICTION_STEPS: u32 = 4;
    pub const RESPAWN_RANDOM_CANDIDATES: u32 = 20;
    pub const RESPAWN_EDGE_MARGIN: f32 = 60.0;

    /// Extra life every this many points
    pub const BONUS_LIFE_STEP: u64 = 100_000;
}

/// Wrap a coordinate once into `[0, limit]`
#[inline]
pub fn wrap_coord(v: f32, limit: f32) -> f32 {
    if v < 0.0 {
        v + limit
    } else if v > limit {
        v - limit
    } else {
        v
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector pointing along `heading` (radians)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_coord() {
        assert_eq!(wrap_coord(-5.0, 800.0), 795.0);
        assert_eq!(wrap_coord(805.0, 800.0), 5.0);
        assert_eq!(wrap_coord(400.0, 800.0), 400.0);
        // Edges are inside the range
        assert_eq!(wrap_coord(0.0, 800.0), 0.0);
        assert_eq!(wrap_coord(800.0, 800.0), 800.0);
    }

    #[test]
    fn test_heading_vector() {
        let v = heading_vector(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    proptest::proptest! {
        #[test]
        fn prop_wrap_lands_in_arena(v in -799.0f32..1599.0) {
            let w = wrap_coord(v, 800.0);
            proptest::prop_assert!((0.0..=800.0).contains(&w));
            // Wrapping an in-range value is a no-op
            proptest::prop_assert_eq!(wrap_coord(w, 800.0), w);
        }
    }
}
