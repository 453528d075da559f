//! Game state and core simulation types
//!
//! `GameState` is the single owner of every entity collection. Entities hold
//! simulation state only; renderers read them through `snapshot`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::schedule::Scheduler;
use super::tick::TickInput;
use crate::consts::*;
use crate::heading_vector;
use crate::settings::Settings;

/// Stable identifier issued to every entity at creation
pub type EntityId = u32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen, state still renderable
    Paused,
    /// Run ended (terminal until restart)
    GameOver,
}

/// Gameplay variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Center respawn, bullets despawn off-arena
    Traditional,
    /// Predictive safe respawn, wrapping bullets, exhaust trail
    #[default]
    Enhanced,
}

impl GameMode {
    /// Invulnerability granted after a respawn (ms)
    pub fn invulnerability_ms(self) -> f32 {
        match self {
            GameMode::Traditional => INVULNERABLE_TRADITIONAL_MS,
            GameMode::Enhanced => INVULNERABLE_ENHANCED_MS,
        }
    }
}

/// Score, lives and level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
}

/// Draw a value in `[-spread/2, spread/2)`
pub(crate) fn jitter(rng: &mut Pcg32, spread: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * spread
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians
    pub heading: f32,
    pub radius: f32,
    /// Counts down to zero; firing is allowed at or below zero
    pub shoot_cooldown_ms: f32,
    pub invulnerable_ms_remaining: f32,
    /// Countdown until the next respawn attempt while inactive
    pub respawn_ms_remaining: f32,
    /// False while awaiting respawn
    pub active: bool,
    /// Blink state for renderers
    pub visible: bool,
    blink_accum_ms: f32,
    exhaust_accum_ms: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            radius: PLAYER_RADIUS,
            shoot_cooldown_ms: 0.0,
            invulnerable_ms_remaining: 0.0,
            respawn_ms_remaining: 0.0,
            active: true,
            visible: true,
            blink_accum_ms: 0.0,
            exhaust_accum_ms: 0.0,
        }
    }

    /// Move to `pos` at rest
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms_remaining > 0.0
    }

    /// Whether asteroid collisions apply this tick
    pub fn is_vulnerable(&self) -> bool {
        self.active && !self.is_invulnerable()
    }

    /// Integrate one tick of input and motion.
    ///
    /// Order: rotate, thrust, friction, clamp, integrate, wrap. Returns the
    /// exhaust emission point when enough thrust time has accumulated.
    pub fn update(&mut self, dt_ms: f32, input: &TickInput, width: f32, height: f32) -> Option<Vec2> {
        let dt = dt_ms / 1000.0;

        if input.rotate_left {
            self.heading -= PLAYER_ROTATION_SPEED * dt;
        }
        if input.rotate_right {
            self.heading += PLAYER_ROTATION_SPEED * dt;
        }

        let mut exhaust = None;
        if input.thrust {
            self.vel += heading_vector(self.heading) * PLAYER_THRUST;
            self.exhaust_accum_ms += dt_ms;
            if self.exhaust_accum_ms >= EXHAUST_INTERVAL_MS {
                self.exhaust_accum_ms = 0.0;
                exhaust = Some(self.pos - heading_vector(self.heading) * EXHAUST_REAR_DISTANCE);
            }
        } else {
            self.exhaust_accum_ms = 0.0;
        }

        // Flat per-tick friction
        self.vel *= PLAYER_FRICTION;

        let speed = self.vel.length();
        if speed > PLAYER_MAX_SPEED {
            self.vel = self.vel / speed * PLAYER_MAX_SPEED;
        }

        self.pos += self.vel * dt;
        self.wrap(width, height);

        if self.shoot_cooldown_ms > 0.0 {
            self.shoot_cooldown_ms -= dt_ms;
        }

        exhaust
    }

    /// Hard-edge wrap: exactly 0 or `width` is left alone
    fn wrap(&mut self, width: f32, height: f32) {
        if self.pos.x < 0.0 {
            self.pos.x = width;
        } else if self.pos.x > width {
            self.pos.x = 0.0;
        }
        if self.pos.y < 0.0 {
            self.pos.y = height;
        } else if self.pos.y > height {
            self.pos.y = 0.0;
        }
    }

    /// Whether the shot cooldown has elapsed
    pub fn can_fire(&self) -> bool {
        self.shoot_cooldown_ms <= 0.0
    }

    /// Fire from the nose if the cooldown has elapsed
    pub fn shoot(&mut self, id: EntityId, settings: &Settings) -> Option<Bullet> {
        if !self.can_fire() {
            return None;
        }
        let dir = heading_vector(self.heading);
        self.shoot_cooldown_ms = settings.shoot_delay_ms;
        Some(Bullet {
            id,
            pos: self.pos + dir * SHIP_NOSE_DISTANCE,
            // Bullets inherit the ship's momentum
            vel: dir * settings.bullet_speed + self.vel,
            radius: BULLET_RADIUS,
            life_ms: settings.bullet_lifetime_ms,
        })
    }

    /// Count down invulnerability and toggle the blink state
    pub fn tick_invulnerability(&mut self, dt_ms: f32) {
        if self.invulnerable_ms_remaining <= 0.0 {
            return;
        }
        self.invulnerable_ms_remaining -= dt_ms;
        self.blink_accum_ms += dt_ms;
        if self.blink_accum_ms > BLINK_INTERVAL_MS {
            self.visible = !self.visible;
            self.blink_accum_ms = 0.0;
        }
        if self.invulnerable_ms_remaining <= 0.0 {
            self.invulnerable_ms_remaining = 0.0;
            self.visible = true;
        }
    }

    /// Hide the ship and arm the respawn countdown
    pub fn begin_respawn(&mut self) {
        self.active = false;
        self.visible = false;
        self.respawn_ms_remaining = RESPAWN_DELAY_MS;
        self.exhaust_accum_ms = 0.0;
    }

    /// Reactivate at `pos` with an invulnerability window
    pub fn respawn_at(&mut self, pos: Vec2, invulnerable_ms: f32) {
        self.reset(pos);
        self.active = true;
        self.visible = true;
        self.invulnerable_ms_remaining = invulnerable_ms;
        self.blink_accum_ms = 0.0;
    }
}

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Diameter-like extent; radius is `size / 2`
    pub size: f32,
    /// Jagged outline relative to the center, fixed at creation
    pub outline: Vec<Vec2>,
    pub rotation: f32,
    /// Spin rate (rad/s)
    pub spin: f32,
}

impl Asteroid {
    pub fn new(id: EntityId, pos: Vec2, vel: Vec2, size: f32, rng: &mut Pcg32) -> Self {
        let vertex_count = 8 + rng.random_range(0..4);
        let outline = (0..vertex_count)
            .map(|i| {
                let angle = i as f32 / vertex_count as f32 * std::f32::consts::TAU;
                let r = size / 2.0 + jitter(rng, 10.0);
                heading_vector(angle) * r
            })
            .collect();
        Self {
            id,
            pos,
            vel,
            size,
            outline,
            rotation: 0.0,
            spin: jitter(rng, ASTEROID_MAX_SPIN),
        }
    }

    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    /// Points awarded for destroying this asteroid
    pub fn score_value(&self) -> u64 {
        (self.size * ASTEROID_SCORE_PER_SIZE).round().max(0.0) as u64
    }

    pub fn update(&mut self, dt_ms: f32, width: f32, height: f32) {
        let dt = dt_ms / 1000.0;
        self.pos += self.vel * dt;
        self.rotation += self.spin * dt;

        // Wrap once fully past the edge, using the size as buffer
        let s = self.size;
        if self.pos.x < -s {
            self.pos.x = width + s;
        } else if self.pos.x > width + s {
            self.pos.x = -s;
        }
        if self.pos.y < -s {
            self.pos.y = height + s;
        } else if self.pos.y > height + s {
            self.pos.y = -s;
        }
    }
}

/// A ship bullet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Remaining lifetime (ms)
    pub life_ms: f32,
}

impl Bullet {
    /// Advance and report whether the bullet is still alive
    pub fn update(&mut self, dt_ms: f32, width: f32, height: f32, wrap: bool) -> bool {
        self.pos += self.vel * dt_ms / 1000.0;
        self.life_ms -= dt_ms;

        if wrap {
            self.pos.x = crate::wrap_coord(self.pos.x, width);
            self.pos.y = crate::wrap_coord(self.pos.y, height);
            self.life_ms > 0.0
        } else {
            let inside = (0.0..=width).contains(&self.pos.x) && (0.0..=height).contains(&self.pos.y);
            inside && self.life_ms > 0.0
        }
    }
}

/// A flying saucer crossing the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Saucer {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Saucer {
    pub fn update(&mut self, dt_ms: f32) {
        self.pos += self.vel * dt_ms / 1000.0;
    }

    /// Saucers never wrap; they leave once past the margin
    pub fn is_offscreen(&self, width: f32, height: f32) -> bool {
        let m = SAUCER_OFFSCREEN_MARGIN;
        self.pos.x < -m || self.pos.x > width + m || self.pos.y < -m || self.pos.y > height + m
    }
}

/// Particle flavor, for renderers and decay rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Explosion debris, fixed decay per tick
    Debris,
    /// Engine exhaust dot, fades over a fixed time
    Exhaust,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

impl Particle {
    /// Advance and report whether the particle is still alive
    pub fn update(&mut self, dt_ms: f32, width: f32, height: f32) -> bool {
        self.pos += self.vel * dt_ms / 1000.0;
        match self.kind {
            ParticleKind::Debris => {
                self.life -= PARTICLE_DECAY;
                self.size *= PARTICLE_SHRINK;
            }
            ParticleKind::Exhaust => {
                self.life -= dt_ms / EXHAUST_LIFETIME_MS;
            }
        }
        let inside = (0.0..=width).contains(&self.pos.x) && (0.0..=height).contains(&self.pos.y);
        inside && self.life > 0.0
    }
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 512;

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Gameplay variant
    pub mode: GameMode,
    /// Current phase
    pub phase: GamePhase,
    pub stats: GameStats,
    /// Score at which the next extra life is awarded
    pub next_bonus_at: u64,
    pub player: Player,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub saucers: Vec<Saucer>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Set once score is earned or an asteroid is removed; locks the mode
    pub session_started: bool,
    /// Last reported thrust state, for edge-triggered events
    pub thrust_active: bool,
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    next_id: EntityId,
}

impl GameState {
    /// Create a new game with the first wave placed
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut state = Self {
            mode: settings.default_mode,
            phase: GamePhase::Playing,
            stats: GameStats {
                score: 0,
                lives: settings.starting_lives,
                level: 1,
            },
            next_bonus_at: BONUS_LIFE_STEP,
            player: Player::new(settings.center()),
            asteroids: Vec::new(),
            bullets: Vec::new(),
            saucers: Vec::new(),
            particles: Vec::new(),
            session_started: false,
            thrust_active: false,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            settings,
        };
        state.spawn_wave();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Whether bullets wrap under the current mode and settings
    pub fn bullets_wrap(&self) -> bool {
        self.settings.bullets_wrap(self.mode)
    }

    /// Reset stats, clear every collection, recenter the player, place a new
    /// wave and reschedule saucers. Mode is kept.
    pub fn restart(&mut self, scheduler: &mut dyn Scheduler) {
        scheduler.cancel_all();
        self.phase = GamePhase::Playing;
        self.stats = GameStats {
            score: 0,
            lives: self.settings.starting_lives,
            level: 1,
        };
        self.next_bonus_at = BONUS_LIFE_STEP;
        self.asteroids.clear();
        self.bullets.clear();
        self.saucers.clear();
        self.particles.clear();
        self.player = Player::new(self.settings.center());
        self.session_started = false;
        self.thrust_active = false;
        self.spawn_wave();
        self.schedule_saucers(scheduler);
        log::info!("Game restarted in {:?} mode", self.mode);
    }

    /// Playing -> Paused. Returns true if the phase changed.
    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            true
        } else {
            false
        }
    }

    /// Paused -> Playing. Returns true if the phase changed.
    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            true
        } else {
            false
        }
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.resume(),
            GamePhase::GameOver => false,
        }
    }

    /// Switch variant; rejected once the session has started
    pub fn set_mode(&mut self, mode: GameMode) -> bool {
        if self.session_started {
            log::warn!("Ignoring mode change to {:?}: gameplay already started", mode);
            return false;
        }
        if self.mode != mode {
            log::info!("Mode changed {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> (f32, f32) {
        (ARENA_WIDTH, ARENA_HEIGHT)
    }

    #[test]
    fn test_player_wraps_left_edge_to_width() {
        let (w, h) = arena();
        let mut player = Player::new(Vec2::new(-1.0, 100.0));
        player.update(16.0, &TickInput::default(), w, h);
        assert_eq!(player.pos.x, w);
    }

    #[test]
    fn test_player_wrap_is_idempotent_at_edges() {
        let (w, h) = arena();
        let mut player = Player::new(Vec2::new(w, 0.0));
        player.update(16.0, &TickInput::default(), w, h);
        assert_eq!(player.pos, Vec2::new(w, 0.0));
    }

    #[test]
    fn test_thrust_changes_velocity_and_position() {
        let (w, h) = arena();
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.heading = std::f32::consts::FRAC_PI_4;
        let input = TickInput {
            thrust: true,
            ..Default::default()
        };
        player.update(100.0, &input, w, h);
        assert!(player.vel.x > 0.0 && player.vel.y > 0.0);
        assert!(player.pos.x > 100.0 && player.pos.y > 100.0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let (w, h) = arena();
        let mut player = Player::new(Vec2::new(100.0, 100.0));
        player.vel = Vec2::new(10_000.0, 0.0);
        player.update(16.0, &TickInput::default(), w, h);
        assert!(player.vel.length() <= PLAYER_MAX_SPEED + 1e-3);
    }

    #[test]
    fn test_shoot_respects_cooldown_and_inherits_velocity() {
        let settings = Settings::default();
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        player.vel = Vec2::new(0.0, 50.0);

        let bullet = player.shoot(1, &settings).expect("first shot fires");
        assert!((bullet.vel.x - settings.bullet_speed).abs() < 1e-3);
        assert!((bullet.vel.y - 50.0).abs() < 1e-3);
        assert!((bullet.pos.x - (400.0 + SHIP_NOSE_DISTANCE)).abs() < 1e-3);
        assert_eq!(player.shoot_cooldown_ms, settings.shoot_delay_ms);

        assert!(player.shoot(2, &settings).is_none());
    }

    #[test]
    fn test_exhaust_emitted_on_interval() {
        let (w, h) = arena();
        let mut player = Player::new(Vec2::new(400.0, 300.0));
        let input = TickInput {
            thrust: true,
            ..Default::default()
        };
        assert!(player.update(50.0, &input, w, h).is_none());
        let exhaust = player.update(50.0, &input, w, h).expect("exhaust after 100ms");
        // Behind the ship (heading 0 -> rear is -x)
        assert!(exhaust.x < player.pos.x);
    }

    #[test]
    fn test_invulnerability_blinks_then_ends_visible() {
        let mut player = Player::new(Vec2::ZERO);
        player.respawn_at(Vec2::new(10.0, 10.0), 500.0);
        let mut saw_hidden = false;
        for _ in 0..40 {
            player.tick_invulnerability(16.0);
            saw_hidden |= !player.visible;
        }
        assert!(saw_hidden);
        assert!(!player.is_invulnerable());
        assert!(player.visible);
    }

    #[test]
    fn test_asteroid_wraps_with_size_buffer() {
        let (w, h) = arena();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut asteroid = Asteroid::new(1, Vec2::new(-30.0, 100.0), Vec2::new(-100.0, 0.0), 40.0, &mut rng);
        asteroid.update(16.0, w, h);
        // Not yet past -size
        assert!(asteroid.pos.x < 0.0 && asteroid.pos.x > -40.0);
        asteroid.update(100.0, w, h);
        assert_eq!(asteroid.pos.x, w + 40.0);
    }

    #[test]
    fn test_asteroid_outline_is_fixed_size_band() {
        let mut rng = Pcg32::seed_from_u64(7);
        let asteroid = Asteroid::new(1, Vec2::ZERO, Vec2::ZERO, 50.0, &mut rng);
        assert!((8..=11).contains(&asteroid.outline.len()));
        for v in &asteroid.outline {
            let r = v.length();
            assert!((20.0..=30.0).contains(&r), "vertex radius {r}");
        }
    }

    #[test]
    fn test_bullet_wrap_vs_despawn() {
        let (w, h) = arena();
        let make = || Bullet {
            id: 1,
            pos: Vec2::new(w - 1.0, 100.0),
            vel: Vec2::new(500.0, 0.0),
            radius: BULLET_RADIUS,
            life_ms: 1000.0,
        };

        let mut wrapping = make();
        assert!(wrapping.update(16.0, w, h, true));
        assert!(wrapping.pos.x < 10.0);

        let mut despawning = make();
        assert!(!despawning.update(16.0, w, h, false));
    }

    #[test]
    fn test_bullet_expires_by_lifetime() {
        let mut bullet = Bullet {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            radius: BULLET_RADIUS,
            life_ms: 20.0,
        };
        assert!(bullet.update(16.0, 800.0, 600.0, true));
        assert!(!bullet.update(16.0, 800.0, 600.0, true));
    }

    #[test]
    fn test_saucer_offscreen_margin() {
        let mut saucer = Saucer {
            id: 1,
            pos: Vec2::new(-30.0, 100.0),
            vel: Vec2::new(-100.0, 0.0),
            radius: SAUCER_RADIUS,
        };
        assert!(!saucer.is_offscreen(800.0, 600.0));
        saucer.update(200.0);
        assert!(saucer.is_offscreen(800.0, 600.0));
    }

    #[test]
    fn test_entity_ids_wrap_instead_of_overflowing() {
        let mut state = GameState::new(Settings::default(), 3);
        state.next_id = EntityId::MAX;
        assert_eq!(state.next_entity_id(), EntityId::MAX);
        assert_eq!(state.next_entity_id(), 0);
    }

    #[test]
    fn test_pause_resume_transitions() {
        let mut state = GameState::new(Settings::default(), 3);
        assert!(state.pause());
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(!state.pause());
        assert!(state.toggle_pause());
        assert_eq!(state.phase, GamePhase::Playing);

        state.phase = GamePhase::GameOver;
        assert!(!state.toggle_pause());
        assert!(!state.resume());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_set_mode_locked_after_start() {
        let mut state = GameState::new(Settings::default(), 3);
        assert!(state.set_mode(GameMode::Traditional));
        assert_eq!(state.mode, GameMode::Traditional);

        state.session_started = true;
        assert!(!state.set_mode(GameMode::Enhanced));
        assert_eq!(state.mode, GameMode::Traditional);
    }
}
