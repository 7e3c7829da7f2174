//! Game engine: owns the world and drives the per-frame tick.
//!
//! [`GameEngine`] wires the pieces together: the [`EventBus`] and its
//! observers, the [`ObjectManager`] roster, the [`SharedSession`], and the
//! external collaborators (clock, pointer tracker, sound player).
//!
//! # Tick order
//!
//! [`GameEngine::update`] runs, in order:
//! 1. countdown check (Init -> Running, publishes `GameStart`)
//! 2. nothing else unless Running
//! 3. apply roster commands posted by observers since the last tick
//! 4. close an expired freeze window (publishes `FreezeEnd`)
//! 5. advance objects, unless frozen
//! 6. random spawns
//! 7. bottom-edge sweep (publishes `BubbleMissed`)
//! 8. throttled pointer collisions (publishes `BubbleHit`/`PowerActivated`)
//! 9. game-over check
//!
//! Observers run later on the dispatcher thread, so their effects on score,
//! health and the roster show up on a following tick.

use std::sync::Arc;

use fastrand::Rng;
use log::{debug, info};

use crate::components::fallingobject::ObjectKind;
use crate::events::bus::EventBus;
use crate::events::gameevent::GameEvent;
use crate::observers::{ObserverContext, register_default_observers};
use crate::resources::audio::SoundPlayer;
use crate::resources::commands::{CommandQueue, WorldCommand};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamesession::{GameSession, GameStates, SharedSession};
use crate::resources::objectpool::ObjectManager;
use crate::resources::pointer::{PointerTracker, confident};
use crate::resources::worldtime::Clock;
use crate::snapshot::{GameSnapshot, ObjectView, Renderer};
use crate::systems::bounds::miss_system;
use crate::systems::collision::{collision_due, collision_system};
use crate::systems::freeze::freeze_system;
use crate::systems::gamestate::{
    countdown_remaining, countdown_system, game_over_system, state_is_running,
};
use crate::systems::spawn::{spawn_bubble, spawn_system};

/// The game core.
pub struct GameEngine {
    config: Arc<GameConfig>,
    clock: Arc<dyn Clock>,
    pointers: Arc<dyn PointerTracker>,
    bus: EventBus,
    session: SharedSession,
    objects: ObjectManager,
    commands: CommandQueue,
    rng: Rng,
}

impl GameEngine {
    /// Validate `config`, register the standard observers and start the bus.
    pub fn new(
        config: Arc<GameConfig>,
        clock: Arc<dyn Clock>,
        pointers: Arc<dyn PointerTracker>,
        sound: Arc<dyn SoundPlayer>,
    ) -> Result<Self, String> {
        config.validate()?;

        let rng = match config.seed {
            // Separate stream from the object manager's placement draws.
            Some(seed) => Rng::with_seed(seed.wrapping_add(1)),
            None => Rng::new(),
        };
        let session = SharedSession::new(GameSession::new(config.initial_health, clock.now()));
        let bus = EventBus::new();
        let commands = CommandQueue::new();

        let ctx = ObserverContext {
            config: Arc::clone(&config),
            session: session.clone(),
            publisher: bus.publisher(),
            commands: commands.sender(),
            clock: Arc::clone(&clock),
            sound,
        };
        register_default_observers(&bus, &ctx);
        bus.start()?;

        info!(
            "[engine] ready: {}x{}, countdown {}s, collision every {} ticks",
            config.window_width, config.window_height, config.countdown, config.collision_interval
        );

        Ok(Self {
            objects: ObjectManager::new(Arc::clone(&config)),
            config,
            clock,
            pointers,
            bus,
            session,
            commands,
            rng,
        })
    }

    /// Advance the game by one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let now = self.clock.now();
        countdown_system(&self.session, self.config.countdown, now, &self.bus.publisher());
        if !state_is_running(&self.session) {
            return;
        }

        self.apply_pending_commands();

        let publisher = self.bus.publisher();
        let frozen = freeze_system(&self.session, &mut self.objects, now, &publisher);
        if !frozen {
            self.objects.update_all(dt);
        }

        spawn_system(&mut self.objects, &mut self.rng, &self.config, frozen);
        miss_system(
            &mut self.objects,
            self.config.window_height as f32,
            &publisher,
        );

        let interval = self.config.collision_interval;
        if self.session.with(|s| collision_due(s, interval)) {
            let pointers = confident(
                self.pointers.active_pointer_positions(),
                self.config.detection_confidence,
            );
            collision_system(&mut self.objects, &pointers, &publisher);
        }

        game_over_system(&self.session);
    }

    /// Apply every roster change observers requested since the last call.
    ///
    /// Called at the top of each running tick; public so hosts and tests can
    /// flush between ticks.
    pub fn apply_pending_commands(&mut self) {
        for cmd in self.commands.drain() {
            debug!("[engine] applying {:?}", cmd);
            match cmd {
                WorldCommand::FreezeBubbles(frozen) => self.objects.freeze_all(frozen),
                WorldCommand::DestroyBubbles => self.destroy_bubbles(),
                WorldCommand::SpawnBubble => {
                    let frozen = self.session.lock().is_frozen();
                    spawn_bubble(&mut self.objects, frozen);
                }
                WorldCommand::SpawnPower(power_type) => {
                    self.objects.spawn_power(power_type);
                }
            }
        }
    }

    fn destroy_bubbles(&mut self) {
        let count = self.objects.remove_all(Some(ObjectKind::Bubble)) as u64;
        info!("[engine] destroy power removed {} bubbles", count);
        if count == 0 {
            return;
        }
        let delta = count.saturating_mul(self.config.score_per_pop);
        let score = self.session.with(|s| s.add_score(delta));
        self.bus.publish(GameEvent::ScoreUpdate { score, delta });
    }

    /// Back to Init with a fresh session and an empty roster.
    ///
    /// The bus is stopped while resetting so no observer can act on the old
    /// session afterwards; events and commands left over from the old play
    /// are discarded. Pools stay warm for the next play.
    pub fn reset(&mut self) -> Result<(), String> {
        self.bus.stop();
        let dropped = self.bus.clear_pending();
        let stale = self.commands.drain().len();
        let removed = self.objects.remove_all(None);
        let now = self.clock.now();
        self.session
            .with(|s| s.reset(self.config.initial_health, now));
        info!(
            "[engine] reset at t={:.2} ({} objects pooled, {} events and {} commands dropped)",
            now, removed, dropped, stale
        );
        self.bus.start()
    }

    /// Copy of everything a renderer may draw.
    pub fn snapshot(&self) -> GameSnapshot {
        let now = self.clock.now();
        let session = self.session.snapshot();
        GameSnapshot {
            state: session.state,
            score: session.score,
            health: session.health,
            freeze_remaining: session.freeze_remaining(now),
            countdown_remaining: countdown_remaining(&session, self.config.countdown, now),
            frame_count: session.frame_count,
            fist_radius: self.config.fist_radius,
            objects: self
                .objects
                .objects(None)
                .map(|(_, object)| ObjectView::from(object))
                .collect(),
        }
    }

    /// Hand the current snapshot to `renderer`.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<(), String> {
        renderer.render(&self.snapshot())
    }

    pub fn state(&self) -> GameStates {
        self.session.state()
    }

    /// Seconds left in the Init countdown.
    pub fn countdown_remaining(&self) -> f64 {
        countdown_remaining(&self.session.snapshot(), self.config.countdown, self.clock.now())
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectManager {
        &mut self.objects
    }

    /// Deliver outstanding events and stop the dispatcher.
    pub fn shutdown(&self) {
        self.bus.stop();
        info!("[engine] shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fallingobject::{ObjectPayload, PowerType};
    use crate::resources::audio::NullSoundPlayer;
    use crate::resources::pointer::{PointerSample, SharedPointers};
    use crate::resources::worldtime::ManualClock;
    use std::time::Duration;

    const DRAIN: Option<Duration> = Some(Duration::from_secs(5));

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::new();
        config.countdown = 0.0;
        config.bubble_spawn_rate = 0.0;
        config.power_spawn_rate = 0.0;
        config.collision_interval = 1;
        config.seed = Some(5);
        config
    }

    fn engine(config: GameConfig) -> (GameEngine, ManualClock, SharedPointers) {
        let clock = ManualClock::new(0.0);
        let pointers = SharedPointers::new();
        let engine = GameEngine::new(
            Arc::new(config),
            Arc::new(clock.clone()),
            Arc::new(pointers.clone()),
            Arc::new(NullSoundPlayer),
        )
        .unwrap();
        (engine, clock, pointers)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quiet_config();
        config.collision_interval = 0;
        let result = GameEngine::new(
            Arc::new(config),
            Arc::new(ManualClock::new(0.0)),
            Arc::new(SharedPointers::new()),
            Arc::new(NullSoundPlayer),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_countdown_blocks_simulation() {
        let mut config = quiet_config();
        config.countdown = 3.0;
        let (mut engine, clock, _) = engine(config);
        let id = engine
            .objects_mut()
            .spawn_with(ObjectPayload::Bubble, 100.0, 0.0, 30.0, 100.0);

        engine.update(0.1);
        assert_eq!(engine.state(), GameStates::Init);
        assert_eq!(engine.objects().get(id).unwrap().y, 0.0);
        assert!((engine.countdown_remaining() - 3.0).abs() < 1e-9);

        clock.set(3.0);
        engine.update(0.1);
        assert_eq!(engine.state(), GameStates::Running);
        assert!((engine.objects().get(id).unwrap().y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_destroy_command_scores_all_bubbles() {
        let (mut engine, _, _) = engine(quiet_config());
        engine.update(0.0);
        for x in [100.0, 200.0, 300.0] {
            engine
                .objects_mut()
                .spawn_with(ObjectPayload::Bubble, x, 100.0, 30.0, 0.0);
        }
        engine.objects_mut().spawn_power(Some(PowerType::Heal));

        engine.commands.sender().send(WorldCommand::DestroyBubbles);
        engine.apply_pending_commands();

        assert_eq!(engine.session().score(), 3);
        assert_eq!(engine.objects().count(Some(ObjectKind::Bubble)), 0);
        assert_eq!(engine.objects().count(Some(ObjectKind::Power)), 1);
    }

    #[test]
    fn test_pop_scores_through_observers() {
        let (mut engine, _, pointers) = engine(quiet_config());
        engine
            .objects_mut()
            .spawn_with(ObjectPayload::Bubble, 100.0, 100.0, 30.0, 0.0);
        pointers.set([PointerSample::new(100.0, 100.0)]);

        engine.update(0.0);
        assert!(engine.bus().wait_until_drained(DRAIN));

        assert_eq!(engine.session().score(), 1);
        assert!(engine.objects().is_empty());
    }

    #[test]
    fn test_low_confidence_pointer_ignored() {
        let (mut engine, _, pointers) = engine(quiet_config());
        engine
            .objects_mut()
            .spawn_with(ObjectPayload::Bubble, 100.0, 100.0, 30.0, 0.0);
        pointers.set([PointerSample::with_confidence(100.0, 100.0, 0.2)]);

        engine.update(0.0);
        assert_eq!(engine.objects().len(), 1);
    }

    #[test]
    fn test_spawner_commands_apply_next_tick() {
        let mut config = quiet_config();
        config.respawn_on_pop = true;
        let (mut engine, _, pointers) = engine(config);
        engine
            .objects_mut()
            .spawn_with(ObjectPayload::Bubble, 100.0, 100.0, 30.0, 0.0);
        pointers.set([PointerSample::new(100.0, 100.0)]);

        engine.update(0.0);
        assert!(engine.bus().wait_until_drained(DRAIN));
        pointers.clear();
        engine.update(0.0);

        assert_eq!(engine.objects().count(Some(ObjectKind::Bubble)), 1);
    }

    #[test]
    fn test_snapshot_reports_roster_and_session() {
        let (mut engine, _, _) = engine(quiet_config());
        engine.update(0.0);
        engine.objects_mut().spawn_power(Some(PowerType::Freeze));

        let snap = engine.snapshot();
        assert_eq!(snap.state, GameStates::Running);
        assert_eq!(snap.frame_count, 1);
        assert_eq!(snap.objects.len(), 1);
        assert_eq!(snap.objects[0].power, Some(PowerType::Freeze));
        assert_eq!(snap.objects[0].label, Some('F'));
        assert_eq!(snap.fist_radius, engine.config().fist_radius);
    }
}
