//! Miss penalty rule.

use std::sync::Arc;

use log::{debug, info};

use crate::events::bus::{EventPublisher, Observer};
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::SharedSession;

/// Subtracts `health_decrease_on_miss` on every miss.
///
/// Publishes `HealthUpdate` after each change and `GameOver` on the miss that
/// brings health down to zero. That miss also latches `game_over` in the
/// session under the same lock, so the end of play cannot be undone by a
/// heal handled later. Further misses change nothing and do not repeat the
/// `GameOver`.
pub struct HealthObserver {
    config: Arc<GameConfig>,
    session: SharedSession,
    publisher: EventPublisher,
}

impl HealthObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            config: Arc::clone(&ctx.config),
            session: ctx.session.clone(),
            publisher: ctx.publisher.clone(),
        }
    }
}

impl Observer for HealthObserver {
    fn name(&self) -> &str {
        "health"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        let GameEvent::BubbleMissed { .. } = event else {
            return Ok(());
        };

        let (ended, health, delta, score) = self.session.with(|s| {
            let delta = s.damage(self.config.health_decrease_on_miss);
            (s.mark_game_over_if_depleted(), s.health, delta, s.score)
        });
        debug!("[health] {:+} -> {}", delta, health);
        self.publisher.publish(GameEvent::HealthUpdate { health, delta });

        if ended {
            info!("[health] depleted, final score {}", score);
            self.publisher.publish(GameEvent::GameOver { final_score: score });
        }
        Ok(())
    }
}
