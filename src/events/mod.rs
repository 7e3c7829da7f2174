//! Event types and the bus that carries them.
//!
//! Events let the engine and the gameplay rules communicate without direct
//! dependencies: the engine publishes what happened, observers decide what
//! it means.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`bus`] – asynchronous publish/subscribe bus and the [`bus::Observer`] trait
//! - [`gameevent`] – the closed set of gameplay events
pub mod audio;
pub mod bus;
pub mod gameevent;
