//! Bubble Pop game core.
//!
//! An event-driven core for an arcade game where falling bubbles and
//! power-ups are popped by tracked hands. Camera capture, pose estimation,
//! drawing and audio output are external; the core talks to them through
//! the [`resources::pointer::PointerTracker`], [`snapshot::Renderer`] and
//! [`resources::audio::SoundPlayer`] traits.

pub mod components;
pub mod events;
pub mod game;
pub mod observers;
pub mod resources;
pub mod snapshot;
pub mod systems;
