//! World events delivered to missions.

use galaxy_rules::{EntityId, PlanetId, PlayerId, Position};
use serde::{Deserialize, Serialize};

/// Something that happened in the simulation and may concern a mission.
///
/// Battles are not events here: they are delivered through the dedicated
/// start/finish calls on [`crate::Campaign`], since start handlers may
/// modify the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A fleet arrived at a point in space.
    FleetAt { fleet: EntityId, position: Position },

    /// A fleet arrived at a planet.
    FleetAtPlanet { fleet: EntityId, planet: PlanetId },

    /// A fleet caught up with another fleet.
    FleetAtFleet { fleet: EntityId, other: EntityId },

    /// The player took a planet.
    Conquered {
        planet: PlanetId,
        previous_owner: Option<PlayerId>,
    },

    /// The player lost a planet.
    Lost { planet: PlanetId },

    Discovered { planet: PlanetId },

    /// The player closed a message.
    MessageSeen { message: String },

    /// A dialogue with a character finished.
    TalkCompleted { person: String },

    PlanetInfected { planet: PlanetId },
    PlanetCured { planet: PlanetId },

    LevelChanged { level: u32 },

    /// A saved game finished loading.
    Loaded,
}

impl WorldEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            WorldEvent::FleetAt { .. } => "fleet_at",
            WorldEvent::FleetAtPlanet { .. } => "fleet_at_planet",
            WorldEvent::FleetAtFleet { .. } => "fleet_at_fleet",
            WorldEvent::Conquered { .. } => "conquered",
            WorldEvent::Lost { .. } => "lost",
            WorldEvent::Discovered { .. } => "discovered",
            WorldEvent::MessageSeen { .. } => "message_seen",
            WorldEvent::TalkCompleted { .. } => "talk_completed",
            WorldEvent::PlanetInfected { .. } => "planet_infected",
            WorldEvent::PlanetCured { .. } => "planet_cured",
            WorldEvent::LevelChanged { .. } => "level_changed",
            WorldEvent::Loaded => "loaded",
        }
    }

    /// Fleets the event is about.
    pub fn fleets(&self) -> Vec<EntityId> {
        match self {
            WorldEvent::FleetAt { fleet, .. } | WorldEvent::FleetAtPlanet { fleet, .. } => vec![*fleet],
            WorldEvent::FleetAtFleet { fleet, other } => vec![*fleet, *other],
            _ => Vec::new(),
        }
    }

    /// The planet the event is about, if any.
    pub fn planet(&self) -> Option<&PlanetId> {
        match self {
            WorldEvent::FleetAtPlanet { planet, .. }
            | WorldEvent::Conquered { planet, .. }
            | WorldEvent::Lost { planet }
            | WorldEvent::Discovered { planet }
            | WorldEvent::PlanetInfected { planet }
            | WorldEvent::PlanetCured { planet } => Some(planet),
            _ => None,
        }
    }
}
