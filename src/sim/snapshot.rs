//! Read-only views for renderers
//!
//! Presentation layers key their drawables by `EntityId` and never touch the
//! simulation state directly.

use glam::Vec2;
use serde::Serialize;

use super::state::{EntityId, GameMode, GamePhase, GameState, GameStats, ParticleKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub heading: f32,
    pub radius: f32,
    pub visible: bool,
    pub active: bool,
    pub invulnerable: bool,
    pub thrusting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsteroidView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub outline: Vec<Vec2>,
}

/// Bullets and saucers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub kind: ParticleKind,
    /// Doubles as opacity
    pub life: f32,
    pub size: f32,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub phase: GamePhase,
    pub mode: GameMode,
    pub stats: GameStats,
    pub player: PlayerView,
    pub asteroids: Vec<AsteroidView>,
    pub bullets: Vec<BodyView>,
    pub saucers: Vec<BodyView>,
    pub particles: Vec<ParticleView>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            width: state.settings.width,
            height: state.settings.height,
            phase: state.phase,
            mode: state.mode,
            stats: state.stats,
            player: PlayerView {
                pos: p.pos,
                heading: p.heading,
                radius: p.radius,
                visible: p.visible,
                active: p.active,
                invulnerable: p.is_invulnerable(),
                thrusting: state.thrust_active,
            },
            asteroids: state
                .asteroids
                .iter()
                .map(|a| AsteroidView {
                    id: a.id,
                    pos: a.pos,
                    radius: a.radius(),
                    rotation: a.rotation,
                    outline: a.outline.clone(),
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .map(|b| BodyView {
                    id: b.id,
                    pos: b.pos,
                    radius: b.radius,
                })
                .collect(),
            saucers: state
                .saucers
                .iter()
                .map(|s| BodyView {
                    id: s.id,
                    pos: s.pos,
                    radius: s.radius,
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    kind: p.kind,
                    life: p.life,
                    size: p.size,
                })
                .collect(),
        }
    }
}
