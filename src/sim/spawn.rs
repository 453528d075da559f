//! Spawn and placement policy
//!
//! Wave placement keeps clear of the ship and of other rocks, destroyed rocks
//! split in two, and saucers enter from either side on a level-scaled roll.

use glam::Vec2;
use rand::Rng;

use super::schedule::{Scheduler, TimerTask, first_saucer_delay_ms};
use super::state::{Asteroid, EntityId, GameState, MAX_PARTICLES, Particle, ParticleKind, Saucer, jitter};
use crate::consts::*;

/// Whether a destroyed asteroid of `size` splits. Non-positive sizes never do.
pub fn splits(size: f32) -> bool {
    size > ASTEROID_SPLIT_MIN_SIZE
}

/// Probability that a saucer roll at `level` spawns one
pub fn saucer_spawn_chance(level: u32) -> f32 {
    (0.2 + level as f32 * 0.05).min(0.6)
}

/// Number of debris particles for an explosion of `size`
pub fn explosion_particle_count(size: f32) -> usize {
    (size / 2.0).floor().max(0.0) as usize
}

impl GameState {
    /// Place `3 + level` asteroids clear of the player and of each other.
    /// Returns how many were placed.
    pub fn spawn_wave(&mut self) -> usize {
        let count = WAVE_BASE_ASTEROIDS + self.stats.level;
        for _ in 0..count {
            let size = ASTEROID_MIN_SIZE + self.rng.random::<f32>() * ASTEROID_SIZE_SPREAD;
            let vel = Vec2::new(
                jitter(&mut self.rng, self.settings.asteroid_speed),
                jitter(&mut self.rng, self.settings.asteroid_speed),
            );
            let pos = self.wave_position(size);
            let id = self.next_entity_id();
            let asteroid = Asteroid::new(id, pos, vel, size, &mut self.rng);
            self.asteroids.push(asteroid);
        }
        log::debug!("Level {}: placed {} asteroids", self.stats.level, count);
        count as usize
    }

    /// Random position at least `220 + size` from the player that does not
    /// crowd already placed rocks. Falls back to the roll farthest from the
    /// player when every try is rejected.
    fn wave_position(&mut self, size: f32) -> Vec2 {
        let clearance = WAVE_PLAYER_CLEARANCE + size;
        let player = self.player.pos;
        let mut best = (Vec2::ZERO, f32::MIN);

        for _ in 0..WAVE_PLACEMENT_TRIES {
            let pos = Vec2::new(
                self.rng.random::<f32>() * self.settings.width,
                self.rng.random::<f32>() * self.settings.height,
            );
            let to_player = crate::distance(pos, player);
            if to_player > best.1 {
                best = (pos, to_player);
            }
            if to_player < clearance {
                continue;
            }
            let crowded = self.asteroids.iter().any(|a| {
                let min_dist = size / 2.0 + a.size / 2.0 + WAVE_OVERLAP_PADDING;
                crate::distance(pos, a.pos) < min_dist
            });
            if !crowded {
                return pos;
            }
        }

        log::debug!("Wave placement exhausted {} tries", WAVE_PLACEMENT_TRIES);
        best.0
    }

    /// Spawn the two halves of a destroyed asteroid. Returns the child count.
    pub fn split_asteroid(&mut self, parent: &Asteroid) -> usize {
        if !splits(parent.size) {
            return 0;
        }
        let size = parent.size / 2.0;
        for _ in 0..2 {
            let pos = parent.pos
                + Vec2::new(
                    jitter(&mut self.rng, SPLIT_POSITION_JITTER),
                    jitter(&mut self.rng, SPLIT_POSITION_JITTER),
                );
            let vel = parent.vel
                + Vec2::new(
                    jitter(&mut self.rng, SPLIT_VELOCITY_JITTER),
                    jitter(&mut self.rng, SPLIT_VELOCITY_JITTER),
                );
            let id = self.next_entity_id();
            let child = Asteroid::new(id, pos, vel, size, &mut self.rng);
            self.asteroids.push(child);
        }
        2
    }

    /// Burst of `floor(size / 2)` debris particles at `pos`
    pub fn spawn_explosion(&mut self, pos: Vec2, size: f32) {
        for _ in 0..explosion_particle_count(size) {
            let vel = Vec2::new(
                jitter(&mut self.rng, PARTICLE_SPEED_SPREAD),
                jitter(&mut self.rng, PARTICLE_SPEED_SPREAD),
            );
            let size = self.rng.random::<f32>() * 3.0 + 1.0;
            self.push_particle(Particle {
                pos,
                vel,
                kind: ParticleKind::Debris,
                life: 1.0,
                size,
            });
        }
    }

    /// Single stationary exhaust dot behind the ship
    pub fn spawn_exhaust(&mut self, pos: Vec2) {
        self.push_particle(Particle {
            pos,
            vel: Vec2::ZERO,
            kind: ParticleKind::Exhaust,
            life: 1.0,
            size: 2.2,
        });
    }

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Roll for a saucer at the current level. Returns its id when spawned.
    pub fn maybe_spawn_saucer(&mut self) -> Option<EntityId> {
        let chance = saucer_spawn_chance(self.stats.level);
        let roll = self.rng.random::<f32>();
        if roll >= chance {
            log::debug!("Saucer roll {:.2} missed (chance {:.2})", roll, chance);
            return None;
        }
        Some(self.spawn_saucer())
    }

    /// Spawn a saucer just outside a random side edge, heading inward
    pub fn spawn_saucer(&mut self) -> EntityId {
        let from_left = self.rng.random::<f32>() < 0.5;
        let lane = (self.settings.height - 2.0 * SAUCER_LANE_MARGIN).max(0.0);
        let y = SAUCER_LANE_MARGIN + self.rng.random::<f32>() * lane;
        let (x, dir) = if from_left {
            (-SAUCER_ENTRY_OFFSET, 1.0)
        } else {
            (self.settings.width + SAUCER_ENTRY_OFFSET, -1.0)
        };
        let speed = SAUCER_MIN_SPEED + self.rng.random::<f32>() * SAUCER_SPEED_SPREAD;
        let drift = jitter(&mut self.rng, SAUCER_DRIFT);

        let id = self.next_entity_id();
        self.saucers.push(Saucer {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::new(dir * speed, drift),
            radius: SAUCER_RADIUS,
        });
        log::debug!("Saucer {} entering from the {}", id, if from_left { "left" } else { "right" });
        id
    }

    /// Cancel pending saucer tasks and arm the first roll for this level
    pub fn schedule_saucers(&mut self, scheduler: &mut dyn Scheduler) {
        scheduler.cancel_all();
        let delay = first_saucer_delay_ms(self.stats.level, &mut self.rng);
        scheduler.arm(delay, TimerTask::FirstSaucer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::schedule::TickClock;
    use proptest::prelude::*;

    fn state() -> GameState {
        GameState::new(Settings::default(), 42)
    }

    #[test]
    fn test_initial_wave_size_and_clearance() {
        let state = state();
        assert_eq!(state.asteroids.len(), 4);
        for a in &state.asteroids {
            assert!(crate::distance(a.pos, state.player.pos) >= WAVE_PLAYER_CLEARANCE + a.size);
            assert!((ASTEROID_MIN_SIZE..=ASTEROID_MIN_SIZE + ASTEROID_SIZE_SPREAD).contains(&a.size));
        }
    }

    #[test]
    fn test_wave_scales_with_level() {
        let mut state = state();
        state.asteroids.clear();
        state.stats.level = 5;
        assert_eq!(state.spawn_wave(), 8);
        assert_eq!(state.asteroids.len(), 8);
    }

    #[test]
    fn test_small_asteroids_do_not_split() {
        let mut state = state();
        state.asteroids.clear();
        let parent = Asteroid::new(99, Vec2::new(100.0, 100.0), Vec2::ZERO, 20.0, &mut state.rng);
        assert_eq!(state.split_asteroid(&parent), 0);
        assert!(state.asteroids.is_empty());

        let degenerate = Asteroid::new(100, Vec2::ZERO, Vec2::ZERO, -4.0, &mut state.rng);
        assert_eq!(state.split_asteroid(&degenerate), 0);
    }

    #[test]
    fn test_split_children_near_parent() {
        let mut state = state();
        state.asteroids.clear();
        let parent = Asteroid::new(
            99,
            Vec2::new(300.0, 300.0),
            Vec2::new(40.0, -20.0),
            50.0,
            &mut state.rng,
        );
        assert_eq!(state.split_asteroid(&parent), 2);
        for child in &state.asteroids {
            assert_eq!(child.size, 25.0);
            assert!((child.pos - parent.pos).abs().max_element() <= 10.0);
            assert!((child.vel - parent.vel).abs().max_element() <= 25.0);
            assert_ne!(child.id, parent.id);
        }
        assert_ne!(state.asteroids[0].id, state.asteroids[1].id);
    }

    #[test]
    fn test_explosion_particle_count() {
        let mut state = state();
        state.spawn_explosion(Vec2::new(10.0, 10.0), 45.0);
        assert_eq!(state.particles.len(), 22);
        assert_eq!(explosion_particle_count(1.0), 0);
    }

    #[test]
    fn test_particles_are_capped() {
        let mut state = state();
        for _ in 0..100 {
            state.spawn_explosion(Vec2::new(10.0, 10.0), 60.0);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_saucer_spawn_chance_capped() {
        assert!((saucer_spawn_chance(1) - 0.25).abs() < 1e-6);
        assert!((saucer_spawn_chance(8) - 0.6).abs() < 1e-6);
        assert!((saucer_spawn_chance(50) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_saucer_enters_heading_inward() {
        let mut state = state();
        for _ in 0..20 {
            state.spawn_saucer();
        }
        for s in &state.saucers {
            if s.pos.x < 0.0 {
                assert!(s.vel.x > 0.0);
            } else {
                assert!(s.pos.x > state.settings.width);
                assert!(s.vel.x < 0.0);
            }
            assert!(s.vel.x.abs() >= SAUCER_MIN_SPEED);
            assert!((SAUCER_LANE_MARGIN..=state.settings.height - SAUCER_LANE_MARGIN).contains(&s.pos.y));
            assert!(!s.is_offscreen(state.settings.width, state.settings.height));
        }
    }

    #[test]
    fn test_schedule_saucers_replaces_pending() {
        let mut state = state();
        let mut clock = TickClock::new();
        state.schedule_saucers(&mut clock);
        state.schedule_saucers(&mut clock);
        assert_eq!(clock.armed(), 1);
    }

    proptest! {
        #[test]
        fn prop_wave_rocks_keep_padded_gap(seed in any::<u64>(), level in 1u32..=5) {
            let mut state = GameState::new(Settings::default(), seed);
            state.asteroids.clear();
            state.stats.level = level;
            state.spawn_wave();
            for (i, a) in state.asteroids.iter().enumerate() {
                for b in &state.asteroids[i + 1..] {
                    let gap = a.size / 2.0 + b.size / 2.0 + WAVE_OVERLAP_PADDING;
                    prop_assert!(crate::distance(a.pos, b.pos) >= gap);
                }
            }
        }

        #[test]
        fn prop_split_halves_size(size in 20.01f32..200.0, seed in any::<u64>()) {
            let mut state = GameState::new(Settings::default(), seed);
            state.asteroids.clear();
            let parent = Asteroid::new(1, Vec2::new(400.0, 300.0), Vec2::ZERO, size, &mut state.rng);
            prop_assert_eq!(state.split_asteroid(&parent), 2);
            prop_assert!(state.asteroids.iter().all(|c| c.size == size / 2.0));
        }
    }
}
