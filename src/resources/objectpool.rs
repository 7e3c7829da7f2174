//! Pooled storage for falling objects.
//!
//! [`ObjectManager`] owns every [`FallingObject`] in a dense arena. Each slot
//! is either on the live roster (active) or parked on the free list of its
//! [`ObjectKind`] (inactive), never both. Spawning pops a free slot of the
//! right kind, or grows the arena when that list is empty; removal pushes the
//! slot back. Both are O(1) with no scanning.
//!
//! The roster is unordered: removal swaps the last entry into the hole.
//! Callers that remove while walking the roster take a snapshot first with
//! [`ObjectManager::ids`].
//!
//! Only the main simulation thread touches the manager.

use std::sync::Arc;

use log::debug;

use crate::components::fallingobject::{
    EntityId, FallingObject, ObjectKind, ObjectPayload, PowerType,
};
use crate::resources::gameconfig::GameConfig;

/// Vertical spawn position, above the visible area.
pub const SPAWN_Y: f32 = -50.0;

/// Fraction of the play width kept clear on each side when spawning.
pub const SPAWN_MARGIN: f32 = 0.1;

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    object: FallingObject,
    /// Position in the roster while active.
    roster_pos: Option<usize>,
}

/// Arena of falling objects with per-kind free lists.
pub struct ObjectManager {
    config: Arc<GameConfig>,
    rng: fastrand::Rng,
    slots: Vec<Slot>,
    free: [Vec<u32>; ObjectKind::COUNT],
    roster: Vec<EntityId>,
    next_generation: u32,
}

impl ObjectManager {
    /// Create an empty manager seeded from `config.seed`, or from entropy.
    pub fn new(config: Arc<GameConfig>) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: Arc<GameConfig>, rng: fastrand::Rng) -> Self {
        Self {
            config,
            rng,
            slots: Vec::new(),
            free: Default::default(),
            roster: Vec::new(),
            next_generation: 0,
        }
    }

    /// Spawn a bubble with random x, radius and speed above the screen.
    pub fn spawn_bubble(&mut self) -> EntityId {
        let x = self.random_spawn_x();
        let (rmin, rmax) = self.config.bubble_radius_range;
        let (smin, smax) = self.config.bubble_speed_range;
        let radius = random_f32_range(&mut self.rng, rmin, rmax);
        let speed = random_f32_range(&mut self.rng, smin, smax);
        self.spawn_with(ObjectPayload::Bubble, x, SPAWN_Y, radius, speed)
    }

    /// Spawn a power-up of `power_type`, or of a random type when `None`.
    pub fn spawn_power(&mut self, power_type: Option<PowerType>) -> EntityId {
        let power_type = power_type.unwrap_or_else(|| PowerType::random(&mut self.rng));
        let x = self.random_spawn_x();
        let radius = self.config.power_radius;
        let speed = self.config.power_speed;
        self.spawn_with(ObjectPayload::Power { power_type }, x, SPAWN_Y, radius, speed)
    }

    /// Spawn an object with explicit placement.
    pub fn spawn_with(
        &mut self,
        payload: ObjectPayload,
        x: f32,
        y: f32,
        radius: f32,
        speed: f32,
    ) -> EntityId {
        let kind = match payload {
            ObjectPayload::Bubble => ObjectKind::Bubble,
            ObjectPayload::Power { .. } => ObjectKind::Power,
        };
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let index = match self.free[kind.index()].pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = generation;
                slot.object.payload = payload;
                index
            }
            None => {
                let index = self.slots.len() as u32;
                let object = match payload {
                    ObjectPayload::Bubble => FallingObject::bubble(),
                    ObjectPayload::Power { power_type } => FallingObject::power(power_type),
                };
                self.slots.push(Slot {
                    generation,
                    object,
                    roster_pos: None,
                });
                index
            }
        };

        let id = EntityId { index, generation };
        let slot = &mut self.slots[index as usize];
        slot.object.activate(x, y, radius, speed);
        slot.roster_pos = Some(self.roster.len());
        self.roster.push(id);
        debug!("spawned {:?} {:?} at ({:.1}, {:.1})", kind, id, x, y);
        id
    }

    fn random_spawn_x(&mut self) -> f32 {
        let width = self.config.window_width as f32;
        let margin = width * SPAWN_MARGIN;
        random_f32_range(&mut self.rng, margin, width - margin)
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.roster_pos.is_some())
    }

    /// Active object behind `id`, if it is still on the roster.
    pub fn get(&self, id: EntityId) -> Option<&FallingObject> {
        self.slot(id).map(|slot| &slot.object)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut FallingObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation && slot.roster_pos.is_some())
            .map(|slot| &mut slot.object)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.slot(id).is_some()
    }

    /// Live roster, optionally filtered by kind.
    pub fn objects(
        &self,
        kind: Option<ObjectKind>,
    ) -> impl Iterator<Item = (EntityId, &FallingObject)> + '_ {
        self.roster.iter().filter_map(move |&id| {
            let object = &self.slots[id.index as usize].object;
            match kind {
                Some(k) if object.kind() != k => None,
                _ => Some((id, object)),
            }
        })
    }

    /// Snapshot of roster handles, safe to hold across removals.
    pub fn ids(&self, kind: Option<ObjectKind>) -> Vec<EntityId> {
        self.objects(kind).map(|(id, _)| id).collect()
    }

    /// Number of active objects, optionally of one kind.
    pub fn count(&self, kind: Option<ObjectKind>) -> usize {
        match kind {
            None => self.roster.len(),
            Some(_) => self.objects(kind).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Number of parked objects ready for reuse.
    pub fn pooled(&self, kind: ObjectKind) -> usize {
        self.free[kind.index()].len()
    }

    /// Total slots ever allocated since the last reset.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Advance every active, non-frozen object by `speed * dt`.
    pub fn update_all(&mut self, dt: f32) {
        for id in &self.roster {
            self.slots[id.index as usize].object.advance(dt);
        }
    }

    /// Take `id` off the roster and park it in its pool.
    ///
    /// Returns `false` (and changes nothing) if `id` is not active.
    pub fn remove_object(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.slot(id).and_then(|slot| slot.roster_pos) else {
            debug!("remove ignored, {:?} is not active", id);
            return false;
        };

        self.roster.swap_remove(pos);
        if let Some(moved) = self.roster.get(pos).copied() {
            self.slots[moved.index as usize].roster_pos = Some(pos);
        }

        let slot = &mut self.slots[id.index as usize];
        slot.roster_pos = None;
        slot.object.deactivate();
        let kind = slot.object.kind();
        self.free[kind.index()].push(id.index);
        true
    }

    /// Remove every active object, optionally only of one kind.
    /// Returns how many were removed.
    pub fn remove_all(&mut self, kind: Option<ObjectKind>) -> usize {
        let ids = self.ids(kind);
        let mut removed = 0;
        for id in ids {
            if self.remove_object(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Set or clear the frozen flag on every active bubble.
    /// Power-ups are unaffected.
    pub fn freeze_all(&mut self, frozen: bool) {
        for id in &self.roster {
            let object = &mut self.slots[id.index as usize].object;
            if object.kind() == ObjectKind::Bubble {
                object.frozen = frozen;
            }
        }
    }

    /// Drop the roster and every pool.
    ///
    /// Observable state (roster, counts, pools) matches a fresh manager.
    /// The generation counter and the RNG stream survive a reset, so handles
    /// issued before it never match new ones.
    pub fn reset(&mut self) {
        self.slots.clear();
        for list in &mut self.free {
            list.clear();
        }
        self.roster.clear();
    }

    /// Verify the roster/pool partition. Intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut pooled = vec![false; self.slots.len()];
        for (k, list) in self.free.iter().enumerate() {
            for &index in list {
                let slot = self
                    .slots
                    .get(index as usize)
                    .ok_or_else(|| format!("free list {} holds unknown slot {}", k, index))?;
                if pooled[index as usize] {
                    return Err(format!("slot {} pooled twice", index));
                }
                pooled[index as usize] = true;
                if slot.object.kind().index() != k {
                    return Err(format!("slot {} parked in the wrong pool", index));
                }
            }
        }
        for (pos, id) in self.roster.iter().enumerate() {
            let slot = self
                .slots
                .get(id.index as usize)
                .ok_or_else(|| format!("roster holds unknown slot {}", id.index))?;
            if slot.roster_pos != Some(pos) || slot.generation != id.generation {
                return Err(format!("roster entry {} out of sync for {:?}", pos, id));
            }
        }
        for (index, slot) in self.slots.iter().enumerate() {
            let on_roster = slot.roster_pos.is_some();
            if slot.object.active != on_roster {
                return Err(format!(
                    "slot {} active={} but on_roster={}",
                    index, slot.object.active, on_roster
                ));
            }
            if on_roster == pooled[index] {
                return Err(format!(
                    "slot {} on_roster={} pooled={}",
                    index, on_roster, pooled[index]
                ));
            }
        }
        Ok(())
    }
}

/// Sample a random f32 in the range [min, max].
/// If the range is smaller than EPSILON, returns min directly.
#[inline]
fn random_f32_range(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range < f32::EPSILON {
        return min;
    }
    min + rng.f32() * range
}
