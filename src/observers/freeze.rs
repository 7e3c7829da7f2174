//! Freeze power-up rule.

use std::sync::Arc;

use log::info;

use crate::components::fallingobject::PowerType;
use crate::events::bus::{EventPublisher, Observer};
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::commands::{CommandSender, WorldCommand};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::SharedSession;
use crate::resources::worldtime::Clock;

/// Opens a freeze window of `power_duration` seconds.
///
/// Collecting another Freeze while one is active restarts the window from
/// now; it does not stack.
pub struct FreezeObserver {
    config: Arc<GameConfig>,
    session: SharedSession,
    publisher: EventPublisher,
    commands: CommandSender,
    clock: Arc<dyn Clock>,
}

impl FreezeObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            config: Arc::clone(&ctx.config),
            session: ctx.session.clone(),
            publisher: ctx.publisher.clone(),
            commands: ctx.commands.clone(),
            clock: Arc::clone(&ctx.clock),
        }
    }
}

impl Observer for FreezeObserver {
    fn name(&self) -> &str {
        "freeze"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        if event.power_type() != Some(PowerType::Freeze) {
            return Ok(());
        }
        let duration = self.config.power_duration;
        let until = self.clock.now() + duration;
        self.session.with(|s| s.freeze_until = Some(until));
        self.commands.send(WorldCommand::FreezeBubbles(true));
        info!("[freeze] bubbles frozen until t={:.2}", until);
        self.publisher.publish(GameEvent::FreezeStart { duration });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::testing::Harness;

    fn power(power: PowerType) -> GameEvent {
        GameEvent::PowerActivated { power, x: 0.0, y: 0.0 }
    }

    #[test]
    fn test_freeze_sets_deadline_and_requests_freeze() {
        let h = Harness::new(GameConfig::new());
        h.clock.set(12.0);
        let observer = FreezeObserver::new(&h.ctx);

        observer.handle(&power(PowerType::Freeze)).unwrap();

        assert_eq!(h.ctx.session.lock().freeze_until, Some(17.0));
        assert_eq!(h.commands.drain(), vec![WorldCommand::FreezeBubbles(true)]);
        assert_eq!(h.published(), vec![GameEvent::FreezeStart { duration: 5.0 }]);
    }

    #[test]
    fn test_second_freeze_restarts_window() {
        let h = Harness::new(GameConfig::new());
        let observer = FreezeObserver::new(&h.ctx);
        observer.handle(&power(PowerType::Freeze)).unwrap();
        h.clock.advance(3.0);
        observer.handle(&power(PowerType::Freeze)).unwrap();
        assert_eq!(h.ctx.session.lock().freeze_until, Some(8.0));
    }

    #[test]
    fn test_other_powers_ignored() {
        let h = Harness::new(GameConfig::new());
        let observer = FreezeObserver::new(&h.ctx);
        observer.handle(&power(PowerType::Heal)).unwrap();
        observer.handle(&power(PowerType::Destroy)).unwrap();
        assert!(h.ctx.session.lock().freeze_until.is_none());
        assert!(h.commands.is_empty());
    }
}
