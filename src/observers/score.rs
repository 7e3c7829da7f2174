//! Score rule.

use std::sync::Arc;

use log::debug;

use crate::events::bus::{EventPublisher, Observer};
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::SharedSession;

/// Adds `score_per_pop` for every popped bubble and reports the new total.
pub struct ScoreObserver {
    config: Arc<GameConfig>,
    session: SharedSession,
    publisher: EventPublisher,
}

impl ScoreObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            config: Arc::clone(&ctx.config),
            session: ctx.session.clone(),
            publisher: ctx.publisher.clone(),
        }
    }
}

impl Observer for ScoreObserver {
    fn name(&self) -> &str {
        "score"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        let GameEvent::BubbleHit { .. } = event else {
            return Ok(());
        };
        let delta = self.config.score_per_pop;
        let score = self.session.with(|s| s.add_score(delta));
        debug!("[score] +{} -> {}", delta, score);
        self.publisher.publish(GameEvent::ScoreUpdate { score, delta });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::testing::Harness;

    fn hit() -> GameEvent {
        GameEvent::BubbleHit { x: 10.0, y: 10.0 }
    }

    #[test]
    fn test_each_hit_adds_points() {
        let mut config = GameConfig::new();
        config.score_per_pop = 3;
        let h = Harness::new(config);
        let observer = ScoreObserver::new(&h.ctx);

        observer.handle(&hit()).unwrap();
        observer.handle(&hit()).unwrap();

        assert_eq!(h.ctx.session.score(), 6);
        assert_eq!(
            h.published(),
            vec![
                GameEvent::ScoreUpdate { score: 3, delta: 3 },
                GameEvent::ScoreUpdate { score: 6, delta: 3 },
            ]
        );
    }

    #[test]
    fn test_other_events_are_ignored() {
        let h = Harness::new(GameConfig::new());
        let observer = ScoreObserver::new(&h.ctx);
        observer.handle(&GameEvent::BubbleMissed { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(h.ctx.session.score(), 0);
        assert!(h.published().is_empty());
    }
}
