//! Read-only view of the game for presentation.
//!
//! A renderer never touches the engine directly. It gets a [`GameSnapshot`]
//! built once per frame by
//! [`GameEngine::snapshot`](crate::game::GameEngine::snapshot), with copies of
//! everything it may draw: the roster, score, health, the two countdowns and
//! the pointer draw radius.

use serde::{Deserialize, Serialize};

use crate::components::fallingobject::{FallingObject, ObjectKind, PowerType};
use crate::resources::gamesession::GameStates;

/// Drawable state of one active object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectView {
    pub kind: ObjectKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub power: Option<PowerType>,
    /// Letter drawn on a power-up.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<char>,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub frozen: bool,
}

impl From<&FallingObject> for ObjectView {
    fn from(object: &FallingObject) -> Self {
        Self {
            kind: object.kind(),
            power: object.power_type(),
            label: object.power_type().map(PowerType::label),
            x: object.x,
            y: object.y,
            radius: object.radius,
            frozen: object.frozen,
        }
    }
}

/// Everything a frame needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub state: GameStates,
    pub score: u64,
    pub health: f32,
    /// Seconds left in the freeze window, zero when not frozen.
    pub freeze_remaining: f64,
    /// Seconds left before play starts, zero outside Init.
    pub countdown_remaining: f64,
    pub frame_count: u64,
    /// Radius to draw tracked pointers with. Not used by the simulation.
    pub fist_radius: f32,
    pub objects: Vec<ObjectView>,
}

impl GameSnapshot {
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.iter().filter(|o| o.kind == kind).count()
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize snapshot: {}", e))
    }
}

/// Presentation sink. Pure read access: nothing flows back into the game.
pub trait Renderer {
    fn render(&mut self, snapshot: &GameSnapshot) -> Result<(), String>;
}
