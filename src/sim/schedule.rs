//! Cancelable deferred tasks
//!
//! The core never owns a timer runtime. It arms tasks and cancels them through
//! `Scheduler`; fired tasks are drained at the start of the next tick so they
//! only ever mutate state on the tick's own call stack.

use rand::Rng;

use crate::consts::*;

/// Work the simulation can defer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTask {
    /// First saucer roll of a level
    FirstSaucer,
    /// Recurring saucer roll; re-armed with the same interval after firing
    SaucerPatrol { interval_ms: f32 },
}

/// Cancelable scheduled-task interface implemented by the driver
pub trait Scheduler {
    /// Run `task` once after `delay_ms`
    fn arm(&mut self, delay_ms: f32, task: TimerTask);

    /// Drop every armed task. Calling with nothing armed is a no-op.
    fn cancel_all(&mut self);

    /// Tasks that fired since the last call, in firing order.
    ///
    /// `elapsed_ms` is the simulated time of the tick about to run;
    /// wall-clock implementations may ignore it.
    fn drain_due(&mut self, elapsed_ms: f32) -> Vec<TimerTask>;
}

#[derive(Debug, Clone)]
struct PendingTask {
    remaining_ms: f32,
    task: TimerTask,
}

/// Scheduler driven by simulated time: only ticks that actually run move it
/// forward, so pausing also pauses every armed task.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    pending: Vec<PendingTask>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed tasks
    pub fn armed(&self) -> usize {
        self.pending.len()
    }

    /// Time until the next task fires, if any
    pub fn next_due_ms(&self) -> Option<f32> {
        self.pending
            .iter()
            .map(|p| p.remaining_ms)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

impl Scheduler for TickClock {
    fn arm(&mut self, delay_ms: f32, task: TimerTask) {
        log::debug!("Armed {:?} in {:.0}ms", task, delay_ms);
        self.pending.push(PendingTask {
            remaining_ms: delay_ms.max(0.0),
            task,
        });
    }

    fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelled {} pending task(s)", self.pending.len());
        }
        self.pending.clear();
    }

    fn drain_due(&mut self, elapsed_ms: f32) -> Vec<TimerTask> {
        let mut due = Vec::new();
        self.pending.retain_mut(|p| {
            p.remaining_ms -= elapsed_ms;
            if p.remaining_ms <= 0.0 {
                due.push(p.task);
                false
            } else {
                true
            }
        });
        due
    }
}

/// Delay before the first saucer roll of `level`: base plus random spread,
/// shortened by up to 3s at higher levels but never below 3s
pub fn first_saucer_delay_ms(level: u32, rng: &mut impl Rng) -> f32 {
    let accel = (level as f32 * SAUCER_LEVEL_ACCEL).min(SAUCER_MAX_ACCEL);
    let delay = SAUCER_FIRST_DELAY + rng.random::<f32>() * SAUCER_FIRST_SPREAD - accel;
    delay.max(SAUCER_MIN_DELAY)
}

/// Interval between recurring saucer rolls
pub fn saucer_patrol_interval_ms(rng: &mut impl Rng) -> f32 {
    SAUCER_MIN_GAP + rng.random::<f32>() * (SAUCER_MAX_GAP - SAUCER_MIN_GAP)
}
