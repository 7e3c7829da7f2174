//! Bottom-edge sweep.
//!
//! An object is past the bottom once its top edge (`y - radius`) is below
//! the play area. Bubbles that get there count as misses; power-ups that
//! nobody collected just disappear.

use log::debug;

use crate::components::fallingobject::ObjectKind;
use crate::events::bus::EventPublisher;
use crate::events::gameevent::GameEvent;
use crate::resources::objectpool::ObjectManager;

/// Remove everything below `bottom`, publishing `BubbleMissed` per bubble.
/// Returns the number of missed bubbles.
pub fn miss_system(objects: &mut ObjectManager, bottom: f32, publisher: &EventPublisher) -> usize {
    let gone: Vec<_> = objects
        .objects(None)
        .filter(|(_, object)| object.is_below(bottom))
        .map(|(id, object)| (id, object.kind(), object.x, object.y))
        .collect();

    let mut missed = 0;
    for (id, kind, x, y) in gone {
        if kind == ObjectKind::Bubble {
            publisher.publish(GameEvent::BubbleMissed { x, y });
            missed += 1;
        } else {
            debug!("[bounds] power-up {:?} fell off uncollected", id);
        }
        objects.remove_object(id);
    }
    missed
}
