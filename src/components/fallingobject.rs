//! Falling object data: bubbles and power-ups.
//!
//! A [`FallingObject`] is a plain value owned by the
//! [`ObjectManager`](crate::resources::objectpool::ObjectManager) arena. It has
//! no identity of its own; callers address it through the [`EntityId`] handle
//! returned on spawn. Objects are never dropped while the game runs: on
//! removal they are reset, marked inactive and parked on the free list of their
//! [`ObjectKind`] until the next spawn of that kind reuses them.
//!
//! # Coordinate System
//!
//! - Origin at the top-left corner of the play area
//! - Y+ is down, so falling increases `y`
//! - `x`/`y` address the object's center; `radius` is in pixels

use serde::{Deserialize, Serialize};

/// Kind of a falling object. Used as the pool key and as a roster filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Bubble,
    Power,
}

impl ObjectKind {
    /// Dense index used by per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            ObjectKind::Bubble => 0,
            ObjectKind::Power => 1,
        }
    }

    /// Number of distinct kinds.
    pub const COUNT: usize = 2;
}

/// Effect carried by a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerType {
    /// Stop all bubbles for the configured duration.
    Freeze,
    /// Pop every bubble on screen, scoring each one.
    Destroy,
    /// Restore health to the initial maximum.
    Heal,
}

impl PowerType {
    pub const ALL: [PowerType; 3] = [PowerType::Freeze, PowerType::Destroy, PowerType::Heal];

    /// Single-letter label for renderers, exposed on `ObjectView::label`.
    pub fn label(self) -> char {
        match self {
            PowerType::Freeze => 'F',
            PowerType::Destroy => 'D',
            PowerType::Heal => 'H',
        }
    }

    /// Pick a power type uniformly at random.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::ALL[rng.usize(0..Self::ALL.len())]
    }
}

/// Kind-specific data of a falling object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectPayload {
    Bubble,
    Power { power_type: PowerType },
}

/// Stable handle to an arena slot.
///
/// The generation changes every time the slot is handed out again, so a
/// handle kept past the object's removal never aliases its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A bubble or power-up falling through the play area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Fall speed in pixels per second.
    pub speed: f32,
    pub payload: ObjectPayload,
    /// True while the object is on the live roster.
    pub active: bool,
    /// When set, [`FallingObject::advance`] leaves the position untouched.
    pub frozen: bool,
}

impl FallingObject {
    /// Create an inactive bubble with zeroed geometry.
    pub fn bubble() -> Self {
        Self::inactive(ObjectPayload::Bubble)
    }

    /// Create an inactive power-up of the given type.
    pub fn power(power_type: PowerType) -> Self {
        Self::inactive(ObjectPayload::Power { power_type })
    }

    fn inactive(payload: ObjectPayload) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: 0.0,
            speed: 0.0,
            payload,
            active: false,
            frozen: false,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self.payload {
            ObjectPayload::Bubble => ObjectKind::Bubble,
            ObjectPayload::Power { .. } => ObjectKind::Power,
        }
    }

    /// The power type if this object is a power-up.
    pub fn power_type(&self) -> Option<PowerType> {
        match self.payload {
            ObjectPayload::Power { power_type } => Some(power_type),
            ObjectPayload::Bubble => None,
        }
    }

    /// Place the object and mark it active. Used when taken from a pool.
    pub fn activate(&mut self, x: f32, y: f32, radius: f32, speed: f32) {
        self.x = x;
        self.y = y;
        self.radius = radius;
        self.speed = speed;
        self.active = true;
        self.frozen = false;
    }

    /// Clear runtime state before the object is parked in its pool.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.frozen = false;
    }

    /// Move down by `speed * dt` unless inactive or frozen.
    pub fn advance(&mut self, dt: f32) {
        if !self.active || self.frozen {
            return;
        }
        self.y += self.speed * dt;
    }

    /// Whether `(px, py)` lies within the object's radius (inclusive).
    pub fn is_hit(&self, px: f32, py: f32) -> bool {
        if !self.active {
            return false;
        }
        let dx = self.x - px;
        let dy = self.y - py;
        (dx * dx + dy * dy).sqrt() <= self.radius
    }

    /// Whether the top edge has passed below `bottom`.
    pub fn is_below(&self, bottom: f32) -> bool {
        self.y - self.radius > bottom
    }
}
