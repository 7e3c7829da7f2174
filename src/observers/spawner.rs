//! Replacement spawns after pops.

use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::events::bus::Observer;
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::commands::{CommandSender, WorldCommand};

/// Requests one new object per popped bubble; every `power_every`-th
/// request is a random power-up instead of a bubble.
pub struct SpawnerObserver {
    commands: CommandSender,
    power_every: u32,
    pops: AtomicU32,
}

impl SpawnerObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            commands: ctx.commands.clone(),
            power_every: ctx.config.power_every,
            pops: AtomicU32::new(0),
        }
    }
}

impl Observer for SpawnerObserver {
    fn name(&self) -> &str {
        "spawner"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        let GameEvent::BubbleHit { .. } = event else {
            return Ok(());
        };
        let pops = self.pops.fetch_add(1, Ordering::Relaxed) + 1;
        let cmd = if self.power_every > 0 && pops % self.power_every == 0 {
            WorldCommand::SpawnPower(None)
        } else {
            WorldCommand::SpawnBubble
        };
        debug!("[spawner] pop #{} -> {:?}", pops, cmd);
        self.commands.send(cmd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::testing::Harness;
    use crate::resources::gameconfig::GameConfig;

    #[test]
    fn test_every_nth_pop_requests_power() {
        let mut config = GameConfig::new();
        config.power_every = 3;
        let h = Harness::new(config);
        let observer = SpawnerObserver::new(&h.ctx);

        for _ in 0..6 {
            observer.handle(&GameEvent::BubbleHit { x: 0.0, y: 0.0 }).unwrap();
        }

        assert_eq!(
            h.commands.drain(),
            vec![
                WorldCommand::SpawnBubble,
                WorldCommand::SpawnBubble,
                WorldCommand::SpawnPower(None),
                WorldCommand::SpawnBubble,
                WorldCommand::SpawnBubble,
                WorldCommand::SpawnPower(None),
            ]
        );
    }

    #[test]
    fn test_zero_interval_never_spawns_power() {
        let mut config = GameConfig::new();
        config.power_every = 0;
        let h = Harness::new(config);
        let observer = SpawnerObserver::new(&h.ctx);
        observer.handle(&GameEvent::BubbleHit { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(h.commands.drain(), vec![WorldCommand::SpawnBubble]);
    }
}
