//! Freeze window expiry.

use log::info;

use crate::events::bus::EventPublisher;
use crate::events::gameevent::GameEvent;
use crate::resources::gamesession::SharedSession;
use crate::resources::objectpool::ObjectManager;

/// Close the freeze window once `now` reaches its deadline.
///
/// Clears the bubbles' frozen flags and publishes `FreezeEnd`. Returns
/// whether the game is still frozen after the check.
pub fn freeze_system(
    session: &SharedSession,
    objects: &mut ObjectManager,
    now: f64,
    publisher: &EventPublisher,
) -> bool {
    let expired = session.with(|s| match s.freeze_until {
        Some(until) if now >= until => {
            s.freeze_until = None;
            Some(false)
        }
        Some(_) => Some(true),
        None => None,
    });

    match expired {
        Some(false) => {
            objects.freeze_all(false);
            info!("[freeze] window closed at t={:.2}", now);
            publisher.publish(GameEvent::FreezeEnd);
            false
        }
        Some(true) => true,
        None => false,
    }
}
