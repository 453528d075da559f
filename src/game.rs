//! Driver-facing game orchestrator
//!
//! Wraps `GameState`, a `Scheduler` and the current key map. A driver calls
//! `set_input` whenever keys change and `advance` once per frame.

use std::collections::HashMap;

use crate::settings::{Settings, SettingsError};
use crate::sim::{
    GameEvent, GameMode, GamePhase, GameState, GameStats, Scheduler, Snapshot, TickClock, TickInput, TickResult,
    tick,
};

/// Pressed state by key identifier (`"ArrowUp"`, `"KeyA"`, `"Space"`, ...)
pub type InputState = HashMap<String, bool>;

const ROTATE_LEFT_KEYS: [&str; 2] = ["ArrowLeft", "KeyA"];
const ROTATE_RIGHT_KEYS: [&str; 2] = ["ArrowRight", "KeyD"];
const THRUST_KEYS: [&str; 2] = ["ArrowUp", "KeyW"];
const FIRE_KEYS: [&str; 1] = ["Space"];

impl TickInput {
    /// Collapse a key map into the controls a tick reads
    pub fn from_keys(keys: &InputState) -> Self {
        let held = |ids: &[&str]| ids.iter().any(|id| keys.get(*id).copied().unwrap_or(false));
        Self {
            rotate_left: held(&ROTATE_LEFT_KEYS),
            rotate_right: held(&ROTATE_RIGHT_KEYS),
            thrust: held(&THRUST_KEYS),
            fire: held(&FIRE_KEYS),
        }
    }
}

/// A running game session
pub struct Game<S: Scheduler = TickClock> {
    state: GameState,
    scheduler: S,
    keys: InputState,
    /// Events raised outside a tick, reported by the next `advance`
    pending: Vec<GameEvent>,
}

impl Game<TickClock> {
    /// Default settings, randomly seeded
    pub fn new() -> Self {
        Self::build(Settings::default(), TickClock::new(), rand::random())
    }

    /// Default settings with a fixed RNG seed
    pub fn with_seed(seed: u64) -> Self {
        Self::build(Settings::default(), TickClock::new(), seed)
    }

    pub fn with_settings(settings: Settings) -> Result<Self, SettingsError> {
        Self::with_scheduler(settings, TickClock::new(), rand::random())
    }
}

impl Default for Game<TickClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scheduler> Game<S> {
    /// Validate `settings` and start a game driven by `scheduler`
    pub fn with_scheduler(settings: Settings, scheduler: S, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings, scheduler, seed))
    }

    fn build(settings: Settings, mut scheduler: S, seed: u64) -> Self {
        let mut state = GameState::new(settings, seed);
        state.schedule_saucers(&mut scheduler);
        log::info!("New game (seed {}, {:?} mode)", seed, state.mode);
        Self {
            state,
            scheduler,
            keys: InputState::new(),
            pending: Vec::new(),
        }
    }

    /// Run one simulation step of `dt_ms` with the current key map
    pub fn advance(&mut self, dt_ms: f32) -> TickResult {
        let input = TickInput::from_keys(&self.keys);
        let mut result = tick(&mut self.state, &input, &mut self.scheduler, dt_ms);
        if !self.pending.is_empty() {
            let mut events = std::mem::take(&mut self.pending);
            events.append(&mut result.events);
            result.events = events;
        }
        result
    }

    /// Merge key states into the current map
    pub fn set_input(&mut self, keys: &InputState) {
        for (key, pressed) in keys {
            self.keys.insert(key.clone(), *pressed);
        }
    }

    /// Set a single key
    pub fn set_key(&mut self, key: &str, pressed: bool) {
        self.keys.insert(key.to_string(), pressed);
    }

    /// Release every key
    pub fn clear_input(&mut self) {
        self.keys.clear();
    }

    pub fn pause(&mut self) -> bool {
        self.state.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.state.resume()
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.state.toggle_pause()
    }

    /// Start over from level 1 in the current mode
    pub fn restart(&mut self) {
        let was_thrusting = self.state.thrust_active;
        self.state.restart(&mut self.scheduler);
        self.pending.clear();
        if was_thrusting {
            self.pending.push(GameEvent::ThrustOff);
        }
    }

    /// Switch variant; returns false once gameplay has started
    pub fn set_mode(&mut self, mode: GameMode) -> bool {
        self.state.set_mode(mode)
    }

    pub fn mode(&self) -> GameMode {
        self.state.mode
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn stats(&self) -> GameStats {
        self.state.stats
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
