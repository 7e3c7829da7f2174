//! Random spawning.
//!
//! # Behavior
//!
//! - One Bernoulli draw per tick for a bubble (`bubble_spawn_rate`) and an
//!   independent one for a power-up (`power_spawn_rate`)
//! - Inter-arrival times are geometric, not a fixed schedule
//! - Bubbles spawned inside a freeze window start frozen

use fastrand::Rng;
use log::debug;

use crate::components::fallingobject::EntityId;
use crate::resources::gameconfig::GameConfig;
use crate::resources::objectpool::ObjectManager;

/// What one spawn pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnOutcome {
    pub bubble: Option<EntityId>,
    pub power: Option<EntityId>,
}

/// Run the per-tick spawn draws.
///
/// # Ordering
///
/// Runs after movement, so new objects appear at the spawn height for one
/// frame before they start falling.
pub fn spawn_system(
    objects: &mut ObjectManager,
    rng: &mut Rng,
    config: &GameConfig,
    frozen: bool,
) -> SpawnOutcome {
    let mut outcome = SpawnOutcome::default();

    if rng.f64() < config.bubble_spawn_rate {
        outcome.bubble = Some(spawn_bubble(objects, frozen));
    }
    if rng.f64() < config.power_spawn_rate {
        let id = objects.spawn_power(None);
        debug!("[spawn] power-up {:?}", id);
        outcome.power = Some(id);
    }
    outcome
}

/// Spawn one bubble, frozen if a freeze window is open.
pub fn spawn_bubble(objects: &mut ObjectManager, frozen: bool) -> EntityId {
    let id = objects.spawn_bubble();
    if frozen {
        if let Some(object) = objects.get_mut(id) {
            object.frozen = true;
        }
    }
    id
}
