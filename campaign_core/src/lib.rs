//! # Campaign Core
//!
//! Mission scripting for the story campaign. This crate drives the narrative
//! missions layered on top of `galaxy_rules`: it tracks objectives, timers and
//! tagged entities, and reacts to world events by revealing objectives,
//! spawning scripted fleets and sequencing cut-scenes.
//!
//! ## Core Components
//!
//! - **helper**: Objective store, timer stores and tag registry behind one facade
//! - **mission**: The mission contract, per-call context and save records
//! - **missions**: The story missions of the built-in campaign
//! - **campaign**: Broadcasts events to every applicable mission, saves and loads
//! - **environment**: World, presentation and localization seams to the host
//!
//! ## Design Philosophy
//!
//! - **Event-Driven**: Missions react to events and ticks; they never own the game loop
//! - **Data-Addressed**: Scripted entities are found again by tag, not by reference
//! - **Resumable**: Every outstanding cut-scene callback is a persisted value

pub mod campaign;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod events;
pub mod helper;
pub mod mission;
pub mod missions;
pub mod objectives;
pub mod tags;
pub mod timers;

#[cfg(test)]
pub(crate) mod testing;

pub use campaign::*;
pub use config::ScriptConfig;
pub use data::{CampaignData, TextCatalog};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use environment::*;
pub use error::{CampaignError, Result};
pub use events::*;
pub use helper::ScriptingHelper;
pub use mission::{AfterPlayback, Continuation, Mission, MissionBase, MissionCtx, MissionRecord, Resume};
pub use objectives::{Objective, ObjectiveState};
pub use tags::TagRegistry;
pub use timers::{MissionTimes, Timeouts};
