//! Component definitions for entities.

use serde::{Deserialize, Serialize};

use super::{EntityId, PlanetId, PlayerId};

/// A point on the starmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A stack of ships or equipment carried by a fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: EntityId,
    /// Technology id, e.g. `"Fighter1"` or `"TradersFreight1"`.
    pub type_id: String,
    pub owner: PlayerId,
    pub count: u32,
    pub hp: i32,
    pub shield: i32,
}

impl InventoryItem {
    /// Create a new item stack with default durability.
    pub fn new(type_id: impl Into<String>, owner: PlayerId, count: u32) -> Self {
        Self {
            id: EntityId::new(),
            type_id: type_id.into(),
            owner,
            count,
            hp: 100,
            shield: 0,
        }
    }

    /// An item stack with no ships left or no hit points is destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.count == 0 || self.hp <= 0
    }
}

/// What a fleet is currently ordered to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum FleetTask {
    #[default]
    Idle,
    /// Fly to a starmap point.
    Move(Position),
    /// Fly to a planet.
    MoveToPlanet(PlanetId),
    /// Pursue and engage another fleet.
    Attack(EntityId),
    /// Engage a planet's defences.
    AttackPlanet(PlanetId),
    /// Stay close to another fleet.
    Follow(EntityId),
}
