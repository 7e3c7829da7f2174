//! Asynchronous publish/subscribe bus with a dedicated dispatcher thread.
//!
//! Publishers push [`GameEvent`]s into an unbounded `crossbeam_channel`
//! queue and return immediately. One background thread, started with
//! [`EventBus::start`], pulls events in FIFO order and hands each one to every
//! [`Observer`] registered for its [`EventKind`], in registration order,
//! before pulling the next event.
//!
//! Fault isolation: an observer that returns `Err` or panics is logged and
//! skipped; the remaining observers for that event and all later events are
//! still delivered.
//!
//! Shutdown: [`EventBus::stop`] enqueues a sentinel behind everything already
//! published, waits for the dispatcher to reach it and joins the thread. Every
//! event enqueued before the stop request is therefore delivered, and no
//! observer runs after `stop` returns. Events published after the sentinel
//! (including ones re-posted by observers while draining) stay queued and are
//! delivered if the bus is started again.
//!
//! Subscribing the same observer twice for one kind is a caller error. It is
//! not deduplicated: debug builds assert, release builds deliver twice.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;

use crate::events::gameevent::{EventKind, GameEvent};

/// How long the dispatcher blocks on an empty queue before polling again.
const DISPATCH_POLL: Duration = Duration::from_millis(100);

/// A unit reacting to published events.
///
/// Handlers run on the dispatcher thread. They must not block for long, since
/// delivery of every later event waits on them.
pub trait Observer: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// React to one event. Errors are logged by the dispatcher and otherwise
    /// ignored.
    fn handle(&self, event: &GameEvent) -> Result<(), String>;
}

/// Shared handle to a registered observer.
pub type ObserverHandle = Arc<dyn Observer>;

type Registry = Arc<RwLock<FxHashMap<EventKind, Vec<ObserverHandle>>>>;

enum Envelope {
    Event(GameEvent),
    Shutdown,
}

/// Count of events enqueued but not yet fully delivered.
#[derive(Default)]
struct PendingCounter {
    count: Mutex<usize>,
    idle: Condvar,
}

impl PendingCounter {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self) {
        *self.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn get(&self) -> usize {
        *self.lock()
    }

    fn wait_idle(&self, timeout: Option<Duration>) -> bool {
        let guard = self.lock();
        match timeout {
            None => {
                let guard = self
                    .idle
                    .wait_while(guard, |count| *count > 0)
                    .unwrap_or_else(PoisonError::into_inner);
                *guard == 0
            }
            Some(timeout) => {
                let (guard, _) = self
                    .idle
                    .wait_timeout_while(guard, timeout, |count| *count > 0)
                    .unwrap_or_else(PoisonError::into_inner);
                *guard == 0
            }
        }
    }
}

/// Cloneable handle for posting events onto a bus.
///
/// Observers hold one of these to re-post derived events.
#[derive(Clone)]
pub struct EventPublisher {
    tx: Sender<Envelope>,
    pending: Arc<PendingCounter>,
}

impl EventPublisher {
    /// Enqueue `event` for asynchronous delivery. Never blocks.
    pub fn publish(&self, event: GameEvent) {
        debug!("[bus] publish {:?}", event);
        self.pending.add();
        if let Err(e) = self.tx.send(Envelope::Event(event)) {
            // Only possible once the bus itself is gone.
            self.pending.done();
            warn!("[bus] dropped event, bus closed: {:?}", event_of(e.into_inner()));
        }
    }
}

fn event_of(envelope: Envelope) -> Option<GameEvent> {
    match envelope {
        Envelope::Event(event) => Some(event),
        Envelope::Shutdown => None,
    }
}

/// Event bus owning the queue, the observer registry and the dispatcher.
pub struct EventBus {
    publisher: EventPublisher,
    rx: Receiver<Envelope>,
    registry: Registry,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a stopped bus with no observers.
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<Envelope>();
        Self {
            publisher: EventPublisher {
                tx,
                pending: Arc::new(PendingCounter::default()),
            },
            rx,
            registry: Arc::new(RwLock::new(FxHashMap::default())),
            worker: Mutex::new(None),
        }
    }

    /// Handle observers and other producers use to publish.
    pub fn publisher(&self) -> EventPublisher {
        self.publisher.clone()
    }

    /// Register `observer` for `kind`. Delivery order is registration order.
    pub fn subscribe(&self, kind: EventKind, observer: ObserverHandle) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let list = registry.entry(kind).or_default();
        debug_assert!(
            !list.iter().any(|o| same_observer(o, &observer)),
            "observer '{}' subscribed twice for {:?}",
            observer.name(),
            kind
        );
        debug!("[bus] subscribe '{}' to {:?}", observer.name(), kind);
        list.push(observer);
    }

    /// Remove `observer` from `kind`. Returns whether it was registered.
    pub fn unsubscribe(&self, kind: EventKind, observer: &ObserverHandle) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = registry.get_mut(&kind) else {
            return false;
        };
        match list.iter().position(|o| same_observer(o, observer)) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of observers registered for `kind`.
    pub fn observer_count(&self, kind: EventKind) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Enqueue `event` for asynchronous delivery. Never blocks.
    pub fn publish(&self, event: GameEvent) {
        self.publisher.publish(event);
    }

    /// Spawn the dispatcher thread. Starting a running bus is a no-op.
    pub fn start(&self) -> Result<(), String> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            debug!("[bus] start ignored, dispatcher already running");
            return Ok(());
        }
        let rx = self.rx.clone();
        let registry = Arc::clone(&self.registry);
        let pending = Arc::clone(&self.publisher.pending);
        let handle = std::thread::Builder::new()
            .name("event-dispatch".into())
            .spawn(move || dispatch_loop(rx, registry, pending))
            .map_err(|e| format!("Failed to spawn event dispatcher: {}", e))?;
        *worker = Some(handle);
        Ok(())
    }

    /// Deliver everything enqueued so far, then stop and join the dispatcher.
    ///
    /// No observer is called after this returns. Stopping a stopped bus is a
    /// no-op.
    pub fn stop(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = worker.take() else {
            return;
        };
        info!("[bus] stop requested, draining queue");
        if self.publisher.tx.send(Envelope::Shutdown).is_err() {
            warn!("[bus] could not enqueue shutdown sentinel");
        }
        if handle.join().is_err() {
            error!("[bus] dispatcher thread panicked");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of events enqueued but not yet delivered to every observer.
    pub fn pending(&self) -> usize {
        self.publisher.pending.get()
    }

    /// Block until every enqueued event has been delivered.
    ///
    /// Returns `true` once the queue is empty, `false` if `timeout` elapsed
    /// first. Events still queued on a stopped bus are never delivered, so
    /// this returns `false` right away in that case.
    pub fn wait_until_drained(&self, timeout: Option<Duration>) -> bool {
        if !self.is_running() {
            return self.pending() == 0;
        }
        self.publisher.pending.wait_idle(timeout)
    }

    /// Discard queued events that have not been dispatched yet.
    ///
    /// Returns how many were dropped.
    pub fn clear_pending(&self) -> usize {
        let mut dropped = 0;
        let mut saw_shutdown = false;
        while let Ok(envelope) = self.rx.try_recv() {
            match envelope {
                Envelope::Event(_) => {
                    dropped += 1;
                    self.publisher.pending.done();
                }
                Envelope::Shutdown => saw_shutdown = true,
            }
        }
        if saw_shutdown {
            // Belongs to a concurrent stop(); put it back.
            let _ = self.publisher.tx.send(Envelope::Shutdown);
        }
        if dropped > 0 {
            debug!("[bus] cleared {} pending events", dropped);
        }
        dropped
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        self.stop();
    }
}

fn same_observer(a: &ObserverHandle, b: &ObserverHandle) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Body of the dispatcher thread.
fn dispatch_loop(rx: Receiver<Envelope>, registry: Registry, pending: Arc<PendingCounter>) {
    info!(
        "[bus] dispatcher starting (id={:?})",
        std::thread::current().id()
    );
    loop {
        match rx.recv_timeout(DISPATCH_POLL) {
            Ok(Envelope::Event(event)) => {
                deliver(&registry, &event);
                pending.done();
            }
            Ok(Envelope::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    info!(
        "[bus] dispatcher exiting (id={:?})",
        std::thread::current().id()
    );
}

/// Hand `event` to every observer of its kind, isolating failures.
fn deliver(registry: &Registry, event: &GameEvent) {
    // Snapshot the list so handlers may (un)subscribe without deadlocking.
    let observers: Vec<ObserverHandle> = registry
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&event.kind())
        .cloned()
        .unwrap_or_default();

    if observers.is_empty() {
        debug!("[bus] no observers for {:?}", event.kind());
        return;
    }

    for observer in observers {
        match catch_unwind(AssertUnwindSafe(|| observer.handle(event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(
                "[bus] observer '{}' failed on {:?}: {}",
                observer.name(),
                event.kind(),
                e
            ),
            Err(panic) => error!(
                "[bus] observer '{}' panicked on {:?}: {}",
                observer.name(),
                event.kind(),
                panic_message(panic.as_ref())
            ),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAIN: Option<Duration> = Some(Duration::from_secs(5));

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Observer for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle(&self, event: &GameEvent) -> Result<(), String> {
            let tag = match event {
                GameEvent::ScoreUpdate { score, .. } => format!("{}(E{})", self.name, score),
                other => format!("{}({:?})", self.name, other.kind()),
            };
            self.log.lock().unwrap().push(tag);
            Ok(())
        }
    }

    struct Failing;

    impl Observer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn handle(&self, _event: &GameEvent) -> Result<(), String> {
            Err("boom".into())
        }
    }

    struct Panicking;

    impl Observer for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        fn handle(&self, _event: &GameEvent) -> Result<(), String> {
            panic!("observer blew up");
        }
    }

    fn recorder(name: &str, log: &Arc<Mutex<Vec<String>>>) -> ObserverHandle {
        Arc::new(Recorder {
            name: name.to_string(),
            log: Arc::clone(log),
        })
    }

    fn score(n: u64) -> GameEvent {
        GameEvent::ScoreUpdate { score: n, delta: 0 }
    }

    // ==================== ORDERING ====================

    #[test]
    fn test_fifo_and_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(EventKind::ScoreUpdate, recorder("O1", &log));
        bus.subscribe(EventKind::ScoreUpdate, recorder("O2", &log));
        bus.start().unwrap();

        bus.publish(score(1));
        bus.publish(score(2));
        assert!(bus.wait_until_drained(DRAIN));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["O1(E1)", "O2(E1)", "O1(E2)", "O2(E2)"]
        );
    }

    #[test]
    fn test_only_matching_kind_is_delivered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(EventKind::FreezeEnd, recorder("freeze", &log));
        bus.start().unwrap();

        bus.publish(GameEvent::GameStart);
        bus.publish(GameEvent::FreezeEnd);
        assert!(bus.wait_until_drained(DRAIN));

        assert_eq!(*log.lock().unwrap(), vec!["freeze(FreezeEnd)"]);
    }

    // ==================== FAULT ISOLATION ====================

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(EventKind::ScoreUpdate, Arc::new(Failing));
        bus.subscribe(EventKind::ScoreUpdate, Arc::new(Panicking));
        bus.subscribe(EventKind::ScoreUpdate, recorder("after", &log));
        bus.start().unwrap();

        bus.publish(score(1));
        bus.publish(score(2));
        assert!(bus.wait_until_drained(DRAIN));

        assert_eq!(*log.lock().unwrap(), vec!["after(E1)", "after(E2)"]);
        assert!(bus.is_running());
    }

    #[test]
    fn test_publish_without_observers_drains() {
        let bus = EventBus::new();
        bus.start().unwrap();
        bus.publish(GameEvent::BubbleHit { x: 1.0, y: 1.0 });
        assert!(bus.wait_until_drained(DRAIN));
        assert_eq!(bus.pending(), 0);
    }

    // ==================== LIFECYCLE ====================

    #[test]
    fn test_stop_drains_events_enqueued_before_stop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(EventKind::ScoreUpdate, recorder("O", &log));
        for n in 0..50 {
            bus.publish(score(n));
        }
        bus.start().unwrap();
        bus.stop();

        assert_eq!(log.lock().unwrap().len(), 50);
        assert!(!bus.is_running());
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_events_published_while_stopped_wait_for_restart() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(EventKind::ScoreUpdate, recorder("O", &log));

        bus.publish(score(7));
        assert!(!bus.wait_until_drained(DRAIN));
        assert!(log.lock().unwrap().is_empty());

        bus.start().unwrap();
        assert!(bus.wait_until_drained(DRAIN));
        assert_eq!(*log.lock().unwrap(), vec!["O(E7)"]);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let bus = EventBus::new();
        bus.start().unwrap();
        bus.start().unwrap();
        assert!(bus.is_running());
        bus.stop();
        bus.stop();
        assert!(!bus.is_running());
    }

    #[test]
    fn test_clear_pending_drops_queued_events() {
        let bus = EventBus::new();
        bus.publish(GameEvent::GameStart);
        bus.publish(GameEvent::FreezeEnd);
        assert_eq!(bus.pending(), 2);
        assert_eq!(bus.clear_pending(), 2);
        assert_eq!(bus.pending(), 0);
        assert!(bus.wait_until_drained(None));
    }

    // ==================== REGISTRY ====================

    #[test]
    fn test_unsubscribe_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        bus.subscribe(EventKind::GameStart, Arc::clone(&a));
        bus.subscribe(EventKind::GameStart, Arc::clone(&b));

        assert!(bus.unsubscribe(EventKind::GameStart, &a));
        assert!(!bus.unsubscribe(EventKind::GameStart, &a));
        assert!(!bus.unsubscribe(EventKind::GameOver, &b));
        assert_eq!(bus.observer_count(EventKind::GameStart), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "subscribed twice")]
    fn test_double_subscribe_asserts_in_debug() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let bus = EventBus::new();
        let a = recorder("a", &log);
        bus.subscribe(EventKind::GameStart, Arc::clone(&a));
        bus.subscribe(EventKind::GameStart, a);
    }
}
