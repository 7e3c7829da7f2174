//! Per-play session state.
//!
//! [`GameSession`] holds the authoritative state machine value, score,
//! health, freeze deadline and frame counters of the current play. The engine
//! and the observers run on different threads, so the session is shared as a
//! [`SharedSession`]: every access goes through its mutex, and the engine
//! takes one consistent copy per tick with [`SharedSession::snapshot`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::resources::gameconfig::MAX_HEALTH;

/// Discrete high-level states the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameStates {
    /// Pre-game countdown, no gameplay updates.
    #[default]
    Init,
    /// Full simulation.
    Running,
    /// Terminal until an external reset.
    GameOver,
}

/// Mutable state of one play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub state: GameStates,
    pub score: u64,
    pub health: f32,
    /// Set once health is depleted. Stays set until reset, so a later heal
    /// cannot bring a finished play back.
    pub game_over: bool,
    /// Clock time at which the freeze window ends.
    pub freeze_until: Option<f64>,
    pub frame_count: u64,
    pub last_collision_check_frame: u64,
    /// Clock time the countdown started.
    pub start_time: f64,
}

impl GameSession {
    pub fn new(initial_health: f32, start_time: f64) -> Self {
        Self {
            state: GameStates::Init,
            score: 0,
            health: initial_health.clamp(0.0, MAX_HEALTH),
            game_over: false,
            freeze_until: None,
            frame_count: 0,
            last_collision_check_frame: 0,
            start_time,
        }
    }

    /// Reinitialize every field in place.
    pub fn reset(&mut self, initial_health: f32, start_time: f64) {
        *self = Self::new(initial_health, start_time);
    }

    /// Add points. Score only ever grows.
    pub fn add_score(&mut self, points: u64) -> u64 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Subtract `amount` from health, clamped to `[0, MAX_HEALTH]`.
    /// Returns the applied (non-positive) delta.
    pub fn damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH);
        self.health - before
    }

    /// Latch the end of play when health is gone. Returns true only on the
    /// call that sets the latch.
    pub fn mark_game_over_if_depleted(&mut self) -> bool {
        if self.game_over || self.health > 0.0 {
            return false;
        }
        self.game_over = true;
        true
    }

    /// Set health to `value`, clamped. Returns the applied delta.
    ///
    /// Ignored once the play is over.
    pub fn restore_health(&mut self, value: f32) -> f32 {
        if self.game_over {
            return 0.0;
        }
        let before = self.health;
        self.health = value.clamp(0.0, MAX_HEALTH);
        self.health - before
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_until.is_some()
    }

    /// Seconds left in the freeze window at clock time `now`.
    pub fn freeze_remaining(&self, now: f64) -> f64 {
        self.freeze_until.map_or(0.0, |until| (until - now).max(0.0))
    }
}

/// Thread-safe handle to the session.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<GameSession>>,
}

impl SharedSession {
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session. A lock poisoned by a panicking observer is
    /// recovered; every mutation leaves the session consistent.
    pub fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut GameSession) -> R) -> R {
        f(&mut self.lock())
    }

    /// Consistent copy of all fields.
    pub fn snapshot(&self) -> GameSession {
        self.lock().clone()
    }

    pub fn state(&self) -> GameStates {
        self.lock().state
    }

    pub fn score(&self) -> u64 {
        self.lock().score
    }

    pub fn health(&self) -> f32 {
        self.lock().health
    }
}
