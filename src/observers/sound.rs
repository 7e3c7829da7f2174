//! Audio cue rule.

use std::sync::Arc;

use log::warn;

use crate::events::bus::Observer;
use crate::events::gameevent::GameEvent;
use crate::resources::audio::{CUE_GAME_OVER, CUE_POP, CUE_POWERUP, SoundPlayer};

/// Plays a cue for pops, power-ups and game over.
///
/// Playback failures are logged here and never reach the dispatcher.
pub struct SoundObserver {
    player: Arc<dyn SoundPlayer>,
}

impl SoundObserver {
    pub fn new(player: Arc<dyn SoundPlayer>) -> Self {
        Self { player }
    }
}

/// Cue for `event`, if it has one.
pub fn cue_for(event: &GameEvent) -> Option<&'static str> {
    match event {
        GameEvent::BubbleHit { .. } => Some(CUE_POP),
        GameEvent::PowerActivated { .. } => Some(CUE_POWERUP),
        GameEvent::GameOver { .. } => Some(CUE_GAME_OVER),
        _ => None,
    }
}

impl Observer for SoundObserver {
    fn name(&self) -> &str {
        "sound"
    }

    fn handle(&self, event: &GameEvent) -> Result<(), String> {
        let Some(cue) = cue_for(event) else {
            return Ok(());
        };
        if let Err(e) = self.player.play(cue) {
            warn!("[sound] cue '{}' not played: {}", cue, e);
        }
        Ok(())
    }
}
