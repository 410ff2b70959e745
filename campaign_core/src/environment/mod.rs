//! The collaborators a mission reaches through its context: the world
//! simulation, the presentation layer and localization.
//!
//! All three are traits so hosts can plug in their own simulation and
//! renderer. `WorldState` implements [`World`]; [`ScriptedPresentation`] is a
//! headless [`Presentation`] that queues playback for the host to complete.

mod scripted;
mod world;

pub use scripted::*;

use galaxy_rules::{
    EntityId, Fleet, FleetTask, Planet, PlanetId, Player, PlayerId, Position, Rect,
};
use serde::{Deserialize, Serialize};

use crate::mission::Continuation;

/// Narrow facade over the simulation.
pub trait World {
    /// In-game hours since campaign start. Never decreases.
    fn elapsed_hours(&self) -> u64;

    fn level(&self) -> u32;
    fn set_level(&mut self, level: u32);

    fn player(&self, id: &PlayerId) -> Option<&Player>;
    /// Clone a player under a new id, hostile to the original.
    fn duplicate_player(&mut self, source: &PlayerId, new_id: PlayerId) -> Option<PlayerId>;
    /// Remove a player and every fleet it owns.
    fn remove_player(&mut self, id: &PlayerId) -> bool;
    fn set_view_limit(&mut self, player: &PlayerId, limit: Option<Rect>);

    fn planet(&self, id: &PlanetId) -> Option<&Planet>;

    fn fleet(&self, id: EntityId) -> Option<&Fleet>;
    fn fleets(&self) -> Box<dyn Iterator<Item = &Fleet> + '_>;
    /// The fleet currently carrying an inventory item.
    fn fleet_with_item(&self, item: EntityId) -> Option<&Fleet>;
    fn create_fleet(&mut self, owner: &PlayerId, name: &str, position: Position) -> EntityId;
    /// Put ships straight into a fleet, ignoring deployment limits.
    fn add_inventory(&mut self, fleet: EntityId, type_id: &str, count: u32) -> Option<EntityId>;
    fn remove_fleet(&mut self, id: EntityId) -> bool;
    fn order_fleet(&mut self, id: EntityId, task: FleetTask) -> bool;

    fn relation(&self, a: &PlayerId, b: &PlayerId) -> i32;
    fn set_relation(&mut self, a: &PlayerId, b: &PlayerId, value: i32);

    /// Drop a message into a player's inbox.
    fn receive_message(&mut self, player: &PlayerId, message: &str) -> bool;
}

/// Simulation speed settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameSpeed {
    #[default]
    Normal,
    Fast,
    Faster,
}

/// Sound output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundChannel {
    /// The ship computer's voice.
    Computer,
    Effects,
    Music,
}

/// Asynchronous audiovisual operations.
///
/// Playback never blocks. When an operation with a continuation finishes, the
/// host passes that continuation to [`crate::Campaign::resume`]. The game
/// clock keeps running meanwhile.
pub trait Presentation {
    fn play_video(&mut self, video: &str, then: Option<Continuation>);
    fn play_sound(&mut self, channel: SoundChannel, sound: &str, then: Option<Continuation>);
    /// Pop a message open; completes when the player acknowledges it.
    fn force_message(&mut self, message: &str, then: Option<Continuation>);
    fn pause(&mut self);
    fn resume(&mut self);
    fn speed(&self) -> GameSpeed;
    fn set_speed(&mut self, speed: GameSpeed);
    fn game_over(&mut self);
    fn win(&mut self);
}

/// Text lookup by key.
pub trait Localization {
    fn text(&self, key: &str) -> Option<String>;

    /// Look up a text and fill its `{0}`, `{1}`… placeholders.
    fn format(&self, key: &str, params: &[&str]) -> Option<String> {
        self.text(key)
            .map(|template| crate::data::substitute(&template, params))
    }
}

/// The collaborators for one dispatch call.
pub struct Host<'a> {
    pub world: &'a mut dyn World,
    pub presentation: &'a mut dyn Presentation,
    pub text: &'a dyn Localization,
}

impl<'a> Host<'a> {
    pub fn new(
        world: &'a mut dyn World,
        presentation: &'a mut dyn Presentation,
        text: &'a dyn Localization,
    ) -> Self {
        Self {
            world,
            presentation,
            text,
        }
    }
}
