//! Game event types carried by the [`EventBus`](crate::events::bus::EventBus).
//!
//! [`EventKind`] is the closed set of kinds observers subscribe to.
//! [`GameEvent`] is the immutable value actually published: one variant per
//! kind, each carrying its own payload.

use serde::{Deserialize, Serialize};

use crate::components::fallingobject::PowerType;

/// Kinds of events observers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    BubbleHit,
    BubbleMissed,
    PowerActivated,
    FreezeStart,
    FreezeEnd,
    ScoreUpdate,
    HealthUpdate,
    GameOver,
    GameStart,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::BubbleHit,
        EventKind::BubbleMissed,
        EventKind::PowerActivated,
        EventKind::FreezeStart,
        EventKind::FreezeEnd,
        EventKind::ScoreUpdate,
        EventKind::HealthUpdate,
        EventKind::GameOver,
        EventKind::GameStart,
    ];
}

/// An event published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A pointer popped a bubble at `(x, y)`.
    BubbleHit { x: f32, y: f32 },
    /// A bubble fell past the bottom edge.
    BubbleMissed { x: f32, y: f32 },
    /// A pointer collected a power-up.
    PowerActivated { power: PowerType, x: f32, y: f32 },
    /// Bubbles stopped for `duration` seconds.
    FreezeStart { duration: f64 },
    FreezeEnd,
    ScoreUpdate { score: u64, delta: u64 },
    HealthUpdate { health: f32, delta: f32 },
    GameOver { final_score: u64 },
    GameStart,
}

impl GameEvent {
    /// Kind used to look up subscribers.
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::BubbleHit { .. } => EventKind::BubbleHit,
            GameEvent::BubbleMissed { .. } => EventKind::BubbleMissed,
            GameEvent::PowerActivated { .. } => EventKind::PowerActivated,
            GameEvent::FreezeStart { .. } => EventKind::FreezeStart,
            GameEvent::FreezeEnd => EventKind::FreezeEnd,
            GameEvent::ScoreUpdate { .. } => EventKind::ScoreUpdate,
            GameEvent::HealthUpdate { .. } => EventKind::HealthUpdate,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::GameStart => EventKind::GameStart,
        }
    }

    /// Power type for [`GameEvent::PowerActivated`], `None` otherwise.
    pub fn power_type(&self) -> Option<PowerType> {
        match self {
            GameEvent::PowerActivated { power, .. } => Some(*power),
            _ => None,
        }
    }
}
