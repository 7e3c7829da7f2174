//! Pointer versus falling object hit detection.
//!
//! Checks are throttled: they run once every `collision_interval` running
//! ticks, never in between. On a check tick every confident pointer is tested
//! against every active object; an object is hit when the pointer lies within
//! its radius.
//!
//! An object is hit at most once per sweep. Pointers are tried in tracker
//! order and the first one over an object claims it; later pointers only see
//! what is left.

use log::debug;

use crate::components::fallingobject::ObjectPayload;
use crate::events::bus::EventPublisher;
use crate::events::gameevent::GameEvent;
use crate::resources::gamesession::GameSession;
use crate::resources::objectpool::ObjectManager;
use crate::resources::pointer::PointerSample;

/// Count one running tick and report whether collisions are checked on it.
pub fn collision_due(session: &mut GameSession, interval: u64) -> bool {
    session.frame_count += 1;
    if session.frame_count - session.last_collision_check_frame >= interval.max(1) {
        session.last_collision_check_frame = session.frame_count;
        true
    } else {
        false
    }
}

/// Remove every object under a pointer, publishing `BubbleHit` or
/// `PowerActivated` for each. Returns the number of objects hit.
pub fn collision_system(
    objects: &mut ObjectManager,
    pointers: &[PointerSample],
    publisher: &EventPublisher,
) -> usize {
    if pointers.is_empty() || objects.is_empty() {
        return 0;
    }

    let candidates = objects.ids(None);
    let mut hits = 0;
    for pointer in pointers {
        for &id in &candidates {
            let Some(object) = objects.get(id) else {
                continue; // claimed by an earlier pointer
            };
            if !object.is_hit(pointer.x, pointer.y) {
                continue;
            }
            let (x, y) = (object.x, object.y);
            let event = match object.payload {
                ObjectPayload::Bubble => GameEvent::BubbleHit { x, y },
                ObjectPayload::Power { power_type } => GameEvent::PowerActivated {
                    power: power_type,
                    x,
                    y,
                },
            };
            debug!("[collision] {:?} hit at ({:.1}, {:.1})", id, pointer.x, pointer.y);
            objects.remove_object(id);
            publisher.publish(event);
            hits += 1;
        }
    }
    hits
}
