//! # Galaxy Rules
//!
//! The world model the campaign scripts act upon - fleets and their inventory,
//! planets, players, the in-game clock and the description of battles.
//! This crate holds world state only; it contains no narrative logic.

pub mod entities;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use world_state::*;
