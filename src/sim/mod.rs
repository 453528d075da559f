//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! audio and platform concerns:
//! - Variable timestep in milliseconds, clamped per call
//! - All mutable state owned by `GameState`, mutated only inside a tick
//! - Deferred work goes through the `Scheduler` seam

pub mod collision;
pub mod respawn;
pub mod schedule;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Body, circles_overlap, collides};
pub use respawn::SafetyCheck;
pub use schedule::{Scheduler, TickClock, TimerTask};
pub use snapshot::{AsteroidView, BodyView, ParticleView, PlayerView, Snapshot};
pub use spawn::{explosion_particle_count, saucer_spawn_chance, splits};
pub use state::{
    Asteroid, Bullet, EntityId, GameMode, GamePhase, GameState, GameStats, MAX_PARTICLES, Particle,
    ParticleKind, Player, Saucer,
};
pub use tick::{GameEvent, TickInput, TickResult, tick};
