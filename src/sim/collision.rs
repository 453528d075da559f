//! Circle-circle collision detection
//!
//! Entity counts are small (tens), so every pair is tested directly with no
//! spatial partitioning.

use glam::Vec2;

use super::state::{Asteroid, Bullet, Player, Saucer};

/// Anything with a position and a circular collision extent
pub trait Body {
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

impl Body for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Body for Asteroid {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        Asteroid::radius(self)
    }
}

impl Body for Bullet {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Body for Saucer {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Two circles overlap iff the center distance is below the radius sum
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    crate::distance(a_pos, b_pos) < a_radius + b_radius
}

/// Symmetric overlap test between two bodies
#[inline]
pub fn collides(a: &impl Body, b: &impl Body) -> bool {
    circles_overlap(a.position(), a.radius(), b.position(), b.radius())
}
