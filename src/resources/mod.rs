//! Long-lived state and collaborator interfaces used by the game core.
//!
//! Each submodule documents the semantics and intended usage of its
//! resource(s).
//!
//! Overview
//! - `audio` – sound cue interface and the background cue thread bridge
//! - `commands` – roster changes routed from observers to the main thread
//! - `gameconfig` – tunables loaded from an INI file
//! - `gamesession` – state machine value, score, health and frame counters
//! - `objectpool` – pooled arena of falling objects and the live roster
//! - `pointer` – tracked pointer (fist) positions
//! - `worldtime` – clock sources for the countdown and the freeze window
pub mod audio;
pub mod commands;
pub mod gameconfig;
pub mod gamesession;
pub mod objectpool;
pub mod pointer;
pub mod worldtime;
