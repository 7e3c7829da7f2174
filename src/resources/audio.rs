//! Sound cue playback.
//!
//! The core only asks for named cues through [`SoundPlayer`]. Playback is
//! fire-and-forget: failures are reported to the caller, which logs and moves
//! on.
//!
//! [`AudioBridge`] runs cue handling on a background thread fed through
//! `crossbeam_channel`, keeping the dispatcher thread free of audio work. Use
//! [`AudioBridge::spawn`] once during initialization and
//! [`AudioBridge::shutdown`] (or drop) during teardown.

use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use log::{debug, warn};

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::systems::audio::audio_thread;

/// Cue played when a bubble pops.
pub const CUE_POP: &str = "pop";
/// Cue played when a power-up is collected.
pub const CUE_POWERUP: &str = "powerup";
/// Cue played on game over.
pub const CUE_GAME_OVER: &str = "game_over";

/// Default cue ids and their sound files.
pub const DEFAULT_CUES: [(&str, &str); 3] = [
    (CUE_POP, "assets/sounds/pop.wav"),
    (CUE_POWERUP, "assets/sounds/powerup.wav"),
    (CUE_GAME_OVER, "assets/sounds/game_over.wav"),
];

/// Capacity of the reply channel. Replies beyond it are dropped by the audio
/// thread until the host polls again.
pub const AUDIO_MESSAGE_CAPACITY: usize = 256;

/// Something that can play a named cue.
pub trait SoundPlayer: Send + Sync {
    fn play(&self, cue: &str) -> Result<(), String>;
}

/// Player that accepts and discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSoundPlayer;

impl SoundPlayer for NullSoundPlayer {
    fn play(&self, cue: &str) -> Result<(), String> {
        debug!("[audio] muted cue '{}'", cue);
        Ok(())
    }
}

/// Bridge between the game and the background audio thread.
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (game -> audio thread).
    tx_cmd: Sender<AudioCmd>,
    /// Receiver for [`AudioMessage`] messages (audio thread -> game).
    rx_msg: Receiver<AudioMessage>,
    /// Join handle for the background audio thread.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AudioBridge {
    /// Spawn the audio thread.
    pub fn spawn() -> Result<Self, String> {
        let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
        let (tx_msg, rx_msg) = bounded::<AudioMessage>(AUDIO_MESSAGE_CAPACITY);

        let handle = std::thread::Builder::new()
            .name("audio".into())
            .spawn(move || audio_thread(rx_cmd, tx_msg))
            .map_err(|e| format!("Failed to spawn audio thread: {}", e))?;

        Ok(Self {
            tx_cmd,
            rx_msg,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Spawn the audio thread and register [`DEFAULT_CUES`].
    pub fn with_default_cues() -> Result<Self, String> {
        let bridge = Self::spawn()?;
        for (id, path) in DEFAULT_CUES {
            bridge.register_cue(id, path)?;
        }
        Ok(bridge)
    }

    /// Make `id` playable from the sound file at `path`.
    pub fn register_cue(&self, id: impl Into<String>, path: impl Into<String>) -> Result<(), String> {
        self.send(AudioCmd::RegisterCue {
            id: id.into(),
            path: path.into(),
        })
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), String> {
        self.tx_cmd
            .send(cmd)
            .map_err(|e| format!("Audio thread unavailable: {:?}", e.into_inner()))
    }

    /// Non-blocking drain of messages reported by the audio thread.
    pub fn poll_messages(&self) -> Vec<AudioMessage> {
        self.rx_msg.try_iter().collect()
    }

    /// Drain pending replies and log the failures. Call once per frame.
    /// Returns how many replies were consumed.
    pub fn log_messages(&self) -> usize {
        let messages = self.poll_messages();
        for message in &messages {
            if let AudioMessage::CueFailed { id, error } = message {
                debug!("[audio] cue '{}' failed: {}", id, error);
            }
        }
        messages.len()
    }

    /// Blocking wait for the next message. Used by tests.
    pub fn recv_message(&self, timeout: std::time::Duration) -> Option<AudioMessage> {
        self.rx_msg.recv_timeout(timeout).ok()
    }

    /// Gracefully request shutdown of the audio thread and join it.
    pub fn shutdown(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = self.tx_cmd.send(AudioCmd::Shutdown);
            if handle.join().is_err() {
                warn!("[audio] thread panicked");
            }
        }
    }
}

impl SoundPlayer for AudioBridge {
    fn play(&self, cue: &str) -> Result<(), String> {
        self.send(AudioCmd::PlayCue { id: cue.to_string() })
    }
}

impl Drop for AudioBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_null_player_accepts_everything() {
        assert!(NullSoundPlayer.play("anything").is_ok());
    }

    #[test]
    fn test_unknown_cue_reports_failure() {
        let bridge = AudioBridge::spawn().unwrap();
        bridge.play("missing").unwrap();
        match bridge.recv_message(WAIT) {
            Some(AudioMessage::CueFailed { id, .. }) => assert_eq!(id, "missing"),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_registered_cue_plays() {
        let path = std::env::temp_dir().join(format!("bubblepop_cue_{}.wav", std::process::id()));
        std::fs::write(&path, b"RIFF").unwrap();

        let bridge = AudioBridge::spawn().unwrap();
        bridge
            .register_cue("pop", path.to_string_lossy().to_string())
            .unwrap();
        bridge.play("pop").unwrap();

        assert_eq!(
            bridge.recv_message(WAIT),
            Some(AudioMessage::CueRegistered { id: "pop".into() })
        );
        assert_eq!(
            bridge.recv_message(WAIT),
            Some(AudioMessage::CuePlayed { id: "pop".into() })
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unpolled_replies_stay_bounded() {
        let bridge = AudioBridge::spawn().unwrap();
        for _ in 0..10_000 {
            bridge.play("missing").unwrap();
        }
        // Joining guarantees every command has been handled.
        bridge.shutdown();
        let pending = bridge.poll_messages().len();
        assert_eq!(pending, AUDIO_MESSAGE_CAPACITY);
    }

    #[test]
    fn test_log_messages_drains_replies() {
        let bridge = AudioBridge::spawn().unwrap();
        bridge.play("missing").unwrap();
        bridge.play("missing").unwrap();
        bridge.shutdown();
        assert_eq!(bridge.log_messages(), 2);
        assert_eq!(bridge.log_messages(), 0);
    }

    #[test]
    fn test_play_after_shutdown_fails_softly() {
        let bridge = AudioBridge::spawn().unwrap();
        bridge.shutdown();
        assert!(bridge.play("pop").is_err());
        bridge.shutdown();
    }
}
