//! Data types for the objects living in the play area.
//!
//! Overview
//! - `fallingobject` – bubbles and power-ups, their kinds and handles
pub mod fallingobject;
