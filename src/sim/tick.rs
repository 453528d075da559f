//! Per-frame simulation step
//!
//! Advances every entity, resolves collisions and their consequences, and
//! reports what happened as an ordered event list for renderers and audio.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::collides;
use super::schedule::{Scheduler, TimerTask, saucer_patrol_interval_ms};
use super::state::{Asteroid, EntityId, GameMode, GamePhase, GameState, GameStats};
use crate::consts::*;

/// Control state for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

/// Something collaborators may want to draw or play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ExplosionAt { x: f32, y: f32, size: f32 },
    AsteroidDestroyed { size: f32 },
    ScoreChanged { total: u64 },
    ExtraLife { lives: u32 },
    LifeLost { remaining: u32 },
    PlayerRespawned { x: f32, y: f32 },
    LevelUp { level: u32 },
    GameOver { final_score: u64 },
    ShotFired,
    ThrustOn,
    ThrustOff,
    SaucerSpawned { id: EntityId },
    SaucerDespawned { id: EntityId },
}

/// Outcome of one `tick`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub stats: GameStats,
    pub phase: GamePhase,
    pub events: Vec<GameEvent>,
}

/// Advance the game by `dt_ms` milliseconds.
///
/// Only runs while playing; otherwise the state is returned untouched.
pub fn tick(state: &mut GameState, input: &TickInput, scheduler: &mut dyn Scheduler, dt_ms: f32) -> TickResult {
    let mut events = Vec::new();

    if state.phase != GamePhase::Playing {
        return TickResult {
            stats: state.stats,
            phase: state.phase,
            events,
        };
    }

    let dt = if dt_ms.is_finite() { dt_ms.clamp(0.0, MAX_FRAME_MS) } else { 0.0 };

    run_timers(state, scheduler, dt, &mut events);

    // Thrust audio follows the visible ship only
    let thrusting = state.player.active && input.thrust;
    if thrusting != state.thrust_active {
        state.thrust_active = thrusting;
        events.push(if thrusting { GameEvent::ThrustOn } else { GameEvent::ThrustOff });
    }

    update_player(state, input, dt, &mut events);
    update_entities(state, dt, &mut events);
    resolve_collisions(state, scheduler, &mut events);

    if state.phase == GamePhase::Playing && state.asteroids.is_empty() {
        next_level(state, scheduler, &mut events);
    }

    TickResult {
        stats: state.stats,
        phase: state.phase,
        events,
    }
}

/// Consume fired saucer tasks on the tick's own call stack
fn run_timers(state: &mut GameState, scheduler: &mut dyn Scheduler, dt: f32, events: &mut Vec<GameEvent>) {
    for task in scheduler.drain_due(dt) {
        let interval_ms = match task {
            TimerTask::FirstSaucer => {
                if let Some(id) = state.maybe_spawn_saucer() {
                    events.push(GameEvent::SaucerSpawned { id });
                }
                saucer_patrol_interval_ms(&mut state.rng)
            }
            TimerTask::SaucerPatrol { interval_ms } => {
                // Never pile saucers up
                if state.saucers.is_empty() {
                    if let Some(id) = state.maybe_spawn_saucer() {
                        events.push(GameEvent::SaucerSpawned { id });
                    }
                }
                interval_ms
            }
        };
        scheduler.arm(interval_ms, TimerTask::SaucerPatrol { interval_ms });
    }
}

/// Respawn countdown, invulnerability, movement and firing
fn update_player(state: &mut GameState, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
    if !state.player.active {
        state.player.respawn_ms_remaining -= dt;
        if state.player.respawn_ms_remaining <= 0.0 {
            if let Some(pos) = state.try_respawn() {
                events.push(GameEvent::PlayerRespawned { x: pos.x, y: pos.y });
            }
        }
        return;
    }

    state.player.tick_invulnerability(dt);

    let (width, height) = (state.settings.width, state.settings.height);
    if let Some(exhaust) = state.player.update(dt, input, width, height) {
        if state.mode == GameMode::Enhanced {
            state.spawn_exhaust(exhaust);
        }
    }

    // Fire requests at the cap or on cooldown are dropped without allocating an id
    if input.fire && state.bullets.len() < state.settings.max_bullets && state.player.can_fire() {
        let id = state.next_entity_id();
        if let Some(bullet) = state.player.shoot(id, &state.settings) {
            state.bullets.push(bullet);
            events.push(GameEvent::ShotFired);
        }
    }

    if !finite(state.player.pos) || !finite(state.player.vel) {
        log::warn!("Player state went non-finite, recentering");
        let center = state.settings.center();
        state.player.reset(center);
    }
}

fn finite(v: Vec2) -> bool {
    v.is_finite()
}

/// Bullets, asteroids, saucers and particles
fn update_entities(state: &mut GameState, dt: f32, events: &mut Vec<GameEvent>) {
    let (width, height) = (state.settings.width, state.settings.height);
    let wrap = state.bullets_wrap();

    state
        .bullets
        .retain_mut(|b| b.update(dt, width, height, wrap) && finite(b.pos));

    for asteroid in &mut state.asteroids {
        asteroid.update(dt, width, height);
    }
    state.asteroids.retain(|a| {
        let ok = finite(a.pos) && finite(a.vel);
        if !ok {
            log::warn!("Dropping asteroid {} with non-finite state", a.id);
        }
        ok
    });

    state.saucers.retain_mut(|s| {
        s.update(dt);
        if s.is_offscreen(width, height) || !finite(s.pos) {
            events.push(GameEvent::SaucerDespawned { id: s.id });
            false
        } else {
            true
        }
    });

    state.particles.retain_mut(|p| p.update(dt, width, height));
}

/// Remove every element whose mark is set
fn remove_marked<T>(items: &mut Vec<T>, marked: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !marked[index];
        index += 1;
        keep
    });
}

/// Bullet x asteroid, bullet x saucer, then ship x asteroid.
///
/// Hits are marked during the pass and removed afterwards, so no element is
/// skipped or processed twice. A bullet stops at the first asteroid it hits.
fn resolve_collisions(state: &mut GameState, scheduler: &mut dyn Scheduler, events: &mut Vec<GameEvent>) {
    let mut spent_bullets = vec![false; state.bullets.len()];
    let mut hit_asteroids = vec![false; state.asteroids.len()];
    let mut hit_saucers = vec![false; state.saucers.len()];
    let mut destroyed: Vec<Asteroid> = Vec::new();

    for (bi, bullet) in state.bullets.iter().enumerate() {
        for (ai, asteroid) in state.asteroids.iter().enumerate() {
            if hit_asteroids[ai] || !collides(bullet, asteroid) {
                continue;
            }
            spent_bullets[bi] = true;
            hit_asteroids[ai] = true;
            destroyed.push(asteroid.clone());
            break;
        }
    }

    let mut downed_saucers = Vec::new();
    for (bi, bullet) in state.bullets.iter().enumerate() {
        if spent_bullets[bi] {
            continue;
        }
        for (si, saucer) in state.saucers.iter().enumerate() {
            if hit_saucers[si] || !collides(bullet, saucer) {
                continue;
            }
            spent_bullets[bi] = true;
            hit_saucers[si] = true;
            downed_saucers.push((saucer.id, saucer.pos));
            break;
        }
    }

    let mut rammed = None;
    if state.player.is_vulnerable() {
        rammed = state
            .asteroids
            .iter()
            .enumerate()
            .find(|(ai, a)| !hit_asteroids[*ai] && collides(&state.player, *a))
            .map(|(ai, _)| ai);
        if let Some(ai) = rammed {
            hit_asteroids[ai] = true;
        }
    }

    remove_marked(&mut state.bullets, &spent_bullets);
    remove_marked(&mut state.asteroids, &hit_asteroids);
    remove_marked(&mut state.saucers, &hit_saucers);
    if hit_asteroids.iter().any(|&h| h) {
        state.session_started = true;
    }

    for asteroid in destroyed {
        events.push(GameEvent::ExplosionAt {
            x: asteroid.pos.x,
            y: asteroid.pos.y,
            size: asteroid.size,
        });
        events.push(GameEvent::AsteroidDestroyed { size: asteroid.size });
        state.spawn_explosion(asteroid.pos, asteroid.size);
        add_score(state, asteroid.score_value(), events);
        state.split_asteroid(&asteroid);
    }

    for (id, pos) in downed_saucers {
        events.push(GameEvent::ExplosionAt {
            x: pos.x,
            y: pos.y,
            size: SHIP_EXPLOSION_SIZE,
        });
        events.push(GameEvent::SaucerDespawned { id });
        state.spawn_explosion(pos, SHIP_EXPLOSION_SIZE);
        add_score(state, SAUCER_SCORE, events);
    }

    if rammed.is_some() {
        player_hit(state, scheduler, events);
    }
}

/// Add points and award an extra life for every threshold crossed
fn add_score(state: &mut GameState, points: u64, events: &mut Vec<GameEvent>) {
    state.stats.score += points;
    state.session_started = true;
    events.push(GameEvent::ScoreChanged {
        total: state.stats.score,
    });
    while state.stats.score >= state.next_bonus_at {
        state.stats.lives += 1;
        state.next_bonus_at += BONUS_LIFE_STEP;
        log::debug!("Extra life at {} points", state.stats.score);
        events.push(GameEvent::ExtraLife {
            lives: state.stats.lives,
        });
    }
}

fn player_hit(state: &mut GameState, scheduler: &mut dyn Scheduler, events: &mut Vec<GameEvent>) {
    let pos = state.player.pos;
    state.stats.lives = state.stats.lives.saturating_sub(1);
    events.push(GameEvent::ExplosionAt {
        x: pos.x,
        y: pos.y,
        size: SHIP_EXPLOSION_SIZE,
    });
    state.spawn_explosion(pos, SHIP_EXPLOSION_SIZE);

    if state.stats.lives == 0 {
        game_over(state, scheduler, events);
    } else {
        state.player.begin_respawn();
        events.push(GameEvent::LifeLost {
            remaining: state.stats.lives,
        });
    }
}

fn game_over(state: &mut GameState, scheduler: &mut dyn Scheduler, events: &mut Vec<GameEvent>) {
    state.phase = GamePhase::GameOver;
    state.player.active = false;
    state.player.visible = false;
    scheduler.cancel_all();
    if state.thrust_active {
        state.thrust_active = false;
        events.push(GameEvent::ThrustOff);
    }
    log::info!("Game over with {} points at level {}", state.stats.score, state.stats.level);
    events.push(GameEvent::GameOver {
        final_score: state.stats.score,
    });
}

fn next_level(state: &mut GameState, scheduler: &mut dyn Scheduler, events: &mut Vec<GameEvent>) {
    state.stats.level += 1;
    state.spawn_wave();
    state.schedule_saucers(scheduler);
    log::info!("Level {} with {} asteroids", state.stats.level, state.asteroids.len());
    events.push(GameEvent::LevelUp {
        level: state.stats.level,
    });
}
