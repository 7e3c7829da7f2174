//! Destroy power-up rule.

use log::info;

use crate::components::fallingobject::PowerType;
use crate::events::bus::Observer;
use crate::events::gameevent::GameEvent;
use crate::observers::ObserverContext;
use crate::resources::commands::{CommandSender, WorldCommand};

/// Asks the engine to pop every active bubble.
///
/// The roster lives on the main thread, so the count (and the
/// `count * score_per_pop` award) is taken when the engine applies
/// [`WorldCommand::DestroyBubbles`].
pub struct DestroyObserver {
    commands: CommandSender,
}

impl DestroyObserver {
    pub fn new(ctx: &ObserverContext) -> Self {
        Self {
            commands: ctx.commands.clone(),
        }
    }
}

impl Observer for DestroyObserver {
    fn name(&self) -> &str {
        "destroy"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        if event.power_type() == Some(PowerType::Destroy) {
            info!("[destroy] bubble wipe requested");
            self.commands.send(WorldCommand::DestroyBubbles);
        }
        Ok(())
    }
}
