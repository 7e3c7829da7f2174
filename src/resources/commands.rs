//! Roster mutations requested from the dispatcher thread.
//!
//! Observers run on the bus thread and must not touch the
//! [`ObjectManager`](crate::resources::objectpool::ObjectManager). They post a
//! [`WorldCommand`] instead; the engine drains the queue on the main thread
//! at the start of each running tick.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::warn;

use crate::components::fallingobject::PowerType;

/// A roster change to apply on the main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldCommand {
    /// Set or clear the frozen flag on every bubble.
    FreezeBubbles(bool),
    /// Score and remove every active bubble.
    DestroyBubbles,
    SpawnBubble,
    SpawnPower(Option<PowerType>),
}

/// Sending half, cloned into observers.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<WorldCommand>,
}

impl CommandSender {
    pub fn send(&self, cmd: WorldCommand) {
        if self.tx.send(cmd).is_err() {
            warn!("world command {:?} dropped, engine gone", cmd);
        }
    }
}

/// Receiving half, owned by the engine.
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<WorldCommand>,
    rx: Receiver<WorldCommand>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every queued command in arrival order.
    pub fn drain(&self) -> Vec<WorldCommand> {
        self.rx.try_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
