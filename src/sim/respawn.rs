//! Respawn placement
//!
//! Traditional mode always returns the ship to the arena center. Enhanced mode
//! tries the center and then random interior points, accepting the first one
//! that stays clear of every threat now and over a short look-ahead.

use glam::Vec2;
use rand::Rng;

use super::state::{Asteroid, GameMode, GameState, Saucer};
use crate::consts::*;

/// Threat positions are extrapolated over this window
#[derive(Debug, Clone, Copy)]
pub struct SafetyCheck {
    pub safe_radius: f32,
    pub horizon_ms: f32,
    pub steps: u32,
    pub width: f32,
    pub height: f32,
}

impl SafetyCheck {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            safe_radius: SAFE_RADIUS,
            horizon_ms: SAFE_HORIZON_MS,
            steps: SAFE_PREDICTION_STEPS,
            width,
            height,
        }
    }

    /// True if `candidate` stays farther than the safe radius from every
    /// asteroid and saucer at the current instant and at each sampled future
    /// instant. Asteroid predictions wrap; saucer predictions do not.
    pub fn is_safe(&self, candidate: Vec2, asteroids: &[Asteroid], saucers: &[Saucer]) -> bool {
        let clear = |p: Vec2| crate::distance(p, candidate) > self.safe_radius;

        if !asteroids.iter().all(|a| clear(a.pos)) || !saucers.iter().all(|s| clear(s.pos)) {
            return false;
        }

        (1..=self.steps).all(|i| {
            let t = self.horizon_ms * i as f32 / self.steps as f32 / 1000.0;
            let rocks_clear = asteroids.iter().all(|a| {
                let p = a.pos + a.vel * t;
                clear(Vec2::new(p.x.rem_euclid(self.width), p.y.rem_euclid(self.height)))
            });
            rocks_clear && saucers.iter().all(|s| clear(s.pos + s.vel * t))
        })
    }
}

impl GameState {
    /// Candidate respawn point for the current mode, or `None` when enhanced
    /// mode finds nothing safe this attempt
    pub fn find_respawn_point(&mut self) -> Option<Vec2> {
        let center = self.settings.center();
        if self.mode == GameMode::Traditional {
            return Some(center);
        }

        let check = SafetyCheck::new(self.settings.width, self.settings.height);
        if check.is_safe(center, &self.asteroids, &self.saucers) {
            return Some(center);
        }

        let span_x = (self.settings.width - 2.0 * RESPAWN_EDGE_MARGIN).max(0.0);
        let span_y = (self.settings.height - 2.0 * RESPAWN_EDGE_MARGIN).max(0.0);
        for _ in 0..RESPAWN_RANDOM_CANDIDATES {
            let candidate = Vec2::new(
                RESPAWN_EDGE_MARGIN + self.rng.random::<f32>() * span_x,
                RESPAWN_EDGE_MARGIN + self.rng.random::<f32>() * span_y,
            );
            if check.is_safe(candidate, &self.asteroids, &self.saucers) {
                return Some(candidate);
            }
        }
        None
    }

    /// Run one respawn attempt. On success the ship is active and
    /// invulnerable; on failure the retry countdown is re-armed.
    pub fn try_respawn(&mut self) -> Option<Vec2> {
        match self.find_respawn_point() {
            Some(pos) => {
                let invulnerable = self.mode.invulnerability_ms();
                self.player.respawn_at(pos, invulnerable);
                log::debug!("Respawned at ({:.0}, {:.0})", pos.x, pos.y);
                Some(pos)
            }
            None => {
                self.player.respawn_ms_remaining = RESPAWN_RETRY_MS;
                log::debug!("No safe respawn point, retrying in {}ms", RESPAWN_RETRY_MS);
                None
            }
        }
    }
}
