//! Per-tick game systems.
//!
//! Each system is a plain function run by
//! [`GameEngine::update`](crate::game::GameEngine::update) in a fixed order.
//!
//! Submodules overview
//! - [`audio`] – background cue thread body
//! - [`bounds`] – remove objects past the bottom edge, report missed bubbles
//! - [`collision`] – throttled pointer hit detection
//! - [`freeze`] – close an expired freeze window
//! - [`gamestate`] – countdown and game-over transitions
//! - [`spawn`] – random bubble and power-up spawns

pub mod audio;
pub mod bounds;
pub mod collision;
pub mod freeze;
pub mod gamestate;
pub mod spawn;
