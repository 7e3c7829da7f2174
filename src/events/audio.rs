//! Messages exchanged with the audio cue thread.
//!
//! See [`crate::resources::audio::AudioBridge`] for the thread itself.

/// Commands sent *to* the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Make `id` playable, backed by the sound file at `path`.
    RegisterCue { id: String, path: String },
    /// Play a previously registered cue once.
    PlayCue { id: String },
    Shutdown,
}

/// Messages sent *back* from the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioMessage {
    CueRegistered { id: String },
    CuePlayed { id: String },
    CueFailed { id: String, error: String },
}
