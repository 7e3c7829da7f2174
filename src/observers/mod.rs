//! Gameplay rules reacting to bus events.
//!
//! Every observer here implements [`Observer`] and runs on the bus dispatcher
//! thread. They only touch the [`SharedSession`] (through its lock), post
//! derived events through an [`EventPublisher`], and request roster changes
//! through a [`CommandSender`]. None of them holds the object manager.
//!
//! Submodules overview
//! - [`score`] – award points on BubbleHit
//! - [`health`] – apply the miss penalty, signal GameOver at zero health
//! - [`freeze`] – open the freeze window on a Freeze power-up
//! - [`destroy`] – request a bubble wipe on a Destroy power-up
//! - [`heal`] – restore health on a Heal power-up
//! - [`sound`] – play named cues through a [`SoundPlayer`]
//! - [`spawner`] – optional replacement spawns after each pop

use std::sync::Arc;

use log::info;

use crate::events::bus::{EventBus, EventPublisher, Observer, ObserverHandle};
use crate::events::gameevent::EventKind;
use crate::resources::audio::SoundPlayer;
use crate::resources::commands::CommandSender;
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::SharedSession;
use crate::resources::worldtime::Clock;

pub mod destroy;
pub mod freeze;
pub mod heal;
pub mod health;
pub mod score;
pub mod sound;
pub mod spawner;

use destroy::DestroyObserver;
use freeze::FreezeObserver;
use heal::HealObserver;
use health::HealthObserver;
use score::ScoreObserver;
use sound::SoundObserver;
use spawner::SpawnerObserver;

/// Handles the observers need to do their work.
#[derive(Clone)]
pub struct ObserverContext {
    pub config: Arc<GameConfig>,
    pub session: SharedSession,
    pub publisher: EventPublisher,
    pub commands: CommandSender,
    pub clock: Arc<dyn Clock>,
    pub sound: Arc<dyn SoundPlayer>,
}

/// Subscribe the standard rule set on `bus`.
///
/// Registration order fixes delivery order: on BubbleHit the score is
/// updated before the pop cue plays; on PowerActivated freeze, destroy and
/// heal run before the power-up cue.
pub fn register_default_observers(bus: &EventBus, ctx: &ObserverContext) {
    let sound: ObserverHandle = Arc::new(SoundObserver::new(Arc::clone(&ctx.sound)));

    bus.subscribe(EventKind::BubbleHit, Arc::new(ScoreObserver::new(ctx)));
    bus.subscribe(EventKind::BubbleHit, Arc::clone(&sound));
    if ctx.config.respawn_on_pop {
        bus.subscribe(EventKind::BubbleHit, Arc::new(SpawnerObserver::new(ctx)));
    }

    bus.subscribe(EventKind::BubbleMissed, Arc::new(HealthObserver::new(ctx)));

    bus.subscribe(EventKind::PowerActivated, Arc::new(FreezeObserver::new(ctx)));
    bus.subscribe(EventKind::PowerActivated, Arc::new(DestroyObserver::new(ctx)));
    bus.subscribe(EventKind::PowerActivated, Arc::new(HealObserver::new(ctx)));
    bus.subscribe(EventKind::PowerActivated, Arc::clone(&sound));

    bus.subscribe(EventKind::GameOver, sound);

    info!(
        "[observers] registered (spawner {})",
        if ctx.config.respawn_on_pop { "on" } else { "off" }
    );
}
