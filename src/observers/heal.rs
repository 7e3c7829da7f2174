//! Heal power-up rule.

use std::sync::Arc;

use log::{debug, info};

use crate::components::fallingobject::PowerType;
use crate::events::bus::{EventPublisher, Observer};
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::SharedSession;

/// Restores health to `initial_health`, unless the play is already over.
pub struct HealObserver {
    config: Arc<GameConfig>,
    session: SharedSession,
    publisher: EventPublisher,
}

impl HealObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            config: Arc::clone(&ctx.config),
            session: ctx.session.clone(),
            publisher: ctx.publisher.clone(),
        }
    }
}

impl Observer for HealObserver {
    fn name(&self) -> &str {
        "heal"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        if event.power_type() != Some(PowerType::Heal) {
            return Ok(());
        }
        let (health, delta, over) = self.session.with(|s| {
            let delta = s.restore_health(self.config.initial_health);
            (s.health, delta, s.game_over)
        });
        if over {
            debug!("[heal] ignored, game already over");
            return Ok(());
        }
        info!("[heal] health restored to {}", health);
        self.publisher.publish(GameEvent::HealthUpdate { health, delta });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::testing::Harness;

    #[test]
    fn test_heal_restores_initial_health() {
        let mut config = GameConfig::new();
        config.initial_health = 80.0;
        let h = Harness::new(config);
        h.ctx.session.with(|s| s.health = 30.0);
        let observer = HealObserver::new(&h.ctx);

        observer
            .handle(&GameEvent::PowerActivated {
                power: PowerType::Heal,
                x: 0.0,
                y: 0.0,
            })
            .unwrap();

        assert_eq!(h.ctx.session.health(), 80.0);
        assert_eq!(
            h.published(),
            vec![GameEvent::HealthUpdate {
                health: 80.0,
                delta: 50.0
            }]
        );
    }

    #[test]
    fn test_heal_after_depletion_is_ignored() {
        let h = Harness::new(GameConfig::new());
        h.ctx.session.with(|s| {
            s.health = 0.0;
            s.mark_game_over_if_depleted();
        });
        let observer = HealObserver::new(&h.ctx);

        observer
            .handle(&GameEvent::PowerActivated {
                power: PowerType::Heal,
                x: 0.0,
                y: 0.0,
            })
            .unwrap();

        assert_eq!(h.ctx.session.health(), 0.0);
        assert!(h.published().is_empty());
    }
}
