//! Background audio cue thread.
//!
//! [`audio_thread`] runs on its own OS thread, owns the cue registry and
//! processes [`AudioCmd`] messages, answering with [`AudioMessage`]s. The
//! game side talks to it through
//! [`AudioBridge`](crate::resources::audio::AudioBridge).
//!
//! Notes
//! - A cue is playable once its file has been found at registration.
//! - Playing an unknown cue is not an error for the game; it is reported
//!   back as [`AudioMessage::CueFailed`] and logged.
//! - The reply channel is bounded. When the host has not polled and it is
//!   full, replies are dropped instead of piling up.

use std::path::Path;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{debug, info, trace, warn};
use rustc_hash::FxHashMap;

use crate::events::audio::{AudioCmd, AudioMessage};

/// Entry point of the dedicated audio thread.
///
/// Blocks on the command channel until it receives [`AudioCmd::Shutdown`]
/// or every sender is gone.
pub fn audio_thread(rx_cmd: Receiver<AudioCmd>, tx_msg: Sender<AudioMessage>) {
    info!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut cues: FxHashMap<String, String> = FxHashMap::default();
    let reply = |msg: AudioMessage| {
        if let Err(TrySendError::Full(msg)) = tx_msg.try_send(msg) {
            trace!("[audio] reply dropped, channel full: {:?}", msg);
        }
    };

    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            AudioCmd::RegisterCue { id, path } => {
                if Path::new(&path).exists() {
                    debug!("[audio] registered id='{}' path='{}'", id, path);
                    cues.insert(id.clone(), path);
                    reply(AudioMessage::CueRegistered { id });
                } else {
                    warn!("[audio] cue file not found id='{}' path='{}'", id, path);
                    reply(AudioMessage::CueFailed {
                        id,
                        error: format!("file not found: {}", path),
                    });
                }
            }
            AudioCmd::PlayCue { id } => match cues.get(&id) {
                Some(path) => {
                    debug!("[audio] play id='{}' path='{}'", id, path);
                    reply(AudioMessage::CuePlayed { id });
                }
                None => {
                    warn!("[audio] play failed id='{}' reason='not loaded'", id);
                    reply(AudioMessage::CueFailed {
                        id,
                        error: "not loaded".into(),
                    });
                }
            },
            AudioCmd::Shutdown => {
                debug!("[audio] shutdown requested");
                break;
            }
        }
    }

    info!(
        "[audio] thread exiting (id={:?})",
        std::thread::current().id()
    );
}
