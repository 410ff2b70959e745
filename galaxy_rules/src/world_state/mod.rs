//! World state management - the central structure holding all game data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::entities::{EntityId, Fleet, FleetTask, PlanetId, PlayerId, Position};
use crate::mechanics::RELATION_NEUTRAL;

/// Axis-aligned starmap rectangle, used for view limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}

/// A planet on the starmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    pub owner: Option<PlayerId>,
    pub position: Position,
    /// Whether a plague currently spreads on this planet.
    #[serde(default)]
    pub infected: bool,
}

impl Planet {
    pub fn new(id: impl Into<String>, owner: Option<PlayerId>, position: Position) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: PlanetId(id),
            owner,
            position,
            infected: false,
        }
    }

    pub fn is_owned_by(&self, player: &PlayerId) -> bool {
        self.owner.as_ref() == Some(player)
    }
}

/// A human or AI participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub race: String,
    pub ai: bool,
    pub money: i64,
    /// Message ids received, oldest first.
    #[serde(default)]
    pub inbox: Vec<String>,
    /// Player id -> relation value (0 hostile, 100 allied).
    #[serde(default)]
    pub relations: BTreeMap<PlayerId, i32>,
    /// Part of the starmap this player may explore.
    #[serde(default)]
    pub view_limit: Option<Rect>,
}

impl Player {
    pub fn new(id: impl Into<String>, race: impl Into<String>, ai: bool) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: PlayerId(id),
            race: race.into(),
            ai,
            money: 0,
            inbox: Vec::new(),
            relations: BTreeMap::new(),
            view_limit: None,
        }
    }
}

/// Errors raised while reading or writing world state.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to encode or decode world state: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The complete state of the game world at any point in time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldState {
    /// In-game hours elapsed since the campaign started.
    pub elapsed_hours: u64,

    /// Current campaign level.
    pub level: u32,

    pub players: BTreeMap<PlayerId, Player>,

    pub planets: BTreeMap<PlanetId, Planet>,

    pub fleets: BTreeMap<EntityId, Fleet>,
}

impl WorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self {
            level: 1,
            ..Self::default()
        }
    }

    /// Advance the game clock.
    pub fn advance_hours(&mut self, hours: u64) {
        self.elapsed_hours += hours;
    }

    /// Add a player to the world.
    pub fn add_player(&mut self, player: Player) -> PlayerId {
        let id = player.id.clone();
        self.players.insert(id.clone(), player);
        id
    }

    /// Add a planet to the world.
    pub fn add_planet(&mut self, planet: Planet) -> PlanetId {
        let id = planet.id.clone();
        self.planets.insert(id.clone(), planet);
        id
    }

    /// Add an already built fleet to the world.
    pub fn add_fleet(&mut self, fleet: Fleet) -> EntityId {
        let id = fleet.id;
        self.fleets.insert(id, fleet);
        id
    }

    /// Create an empty fleet for a player.
    pub fn create_fleet(&mut self, owner: &PlayerId, name: &str, position: Position) -> EntityId {
        self.add_fleet(Fleet::new(owner.clone(), name, position))
    }

    pub fn remove_fleet(&mut self, id: EntityId) -> Option<Fleet> {
        self.fleets.remove(&id)
    }

    pub fn get_fleet(&self, id: EntityId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    pub fn get_fleet_mut(&mut self, id: EntityId) -> Option<&mut Fleet> {
        self.fleets.get_mut(&id)
    }

    /// All fleets owned by a player.
    pub fn fleets_of<'a>(&'a self, owner: &'a PlayerId) -> impl Iterator<Item = &'a Fleet> {
        self.fleets.values().filter(move |f| &f.owner == owner)
    }

    /// The fleet currently carrying an inventory item.
    pub fn fleet_with_item(&self, item: EntityId) -> Option<&Fleet> {
        self.fleets.values().find(|f| f.has_item(item))
    }

    pub fn get_planet(&self, id: &PlanetId) -> Option<&Planet> {
        self.planets.get(id)
    }

    pub fn get_planet_mut(&mut self, id: &PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(id)
    }

    pub fn get_player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Give a fleet a new order.
    pub fn order_fleet(&mut self, id: EntityId, task: FleetTask) -> bool {
        match self.fleets.get_mut(&id) {
            Some(fleet) => {
                fleet.task = task;
                true
            }
            None => false,
        }
    }

    /// Clone a player under a new id so two of its fleets can fight each other.
    ///
    /// The copy is hostile to the original. Returns `None` if the source is
    /// missing or the new id is taken.
    pub fn duplicate_player(&mut self, source: &PlayerId, new_id: PlayerId) -> Option<PlayerId> {
        if self.players.contains_key(&new_id) {
            return None;
        }
        let mut copy = self.players.get(source)?.clone();
        copy.id = new_id.clone();
        copy.ai = true;
        copy.inbox.clear();
        copy.relations.clear();
        self.players.insert(new_id.clone(), copy);
        self.set_relation(source, &new_id, crate::mechanics::RELATION_HOSTILE);
        Some(new_id)
    }

    /// Remove a player together with the fleets it still owns.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        let player = self.players.remove(id)?;
        self.fleets.retain(|_, f| &f.owner != id);
        for other in self.players.values_mut() {
            other.relations.remove(id);
        }
        for planet in self.planets.values_mut() {
            if planet.owner.as_ref() == Some(id) {
                planet.owner = None;
            }
        }
        debug!(player = %id, "player_removed");
        Some(player)
    }

    /// Set the relation value between two players, both ways.
    pub fn set_relation(&mut self, a: &PlayerId, b: &PlayerId, value: i32) {
        if let Some(player) = self.players.get_mut(a) {
            player.relations.insert(b.clone(), value);
        }
        if let Some(player) = self.players.get_mut(b) {
            player.relations.insert(a.clone(), value);
        }
    }

    /// Relation value between two players, neutral when never set.
    pub fn relation(&self, a: &PlayerId, b: &PlayerId) -> i32 {
        self.players
            .get(a)
            .and_then(|p| p.relations.get(b))
            .copied()
            .unwrap_or(RELATION_NEUTRAL)
    }

    /// Deliver a message to a player's inbox.
    pub fn receive_message(&mut self, player: &PlayerId, message: &str) -> bool {
        match self.players.get_mut(player) {
            Some(p) => {
                p.inbox.push(message.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove destroyed inventory and the fleets left without any.
    ///
    /// Returns the ids of the fleets that were removed.
    pub fn prune_destroyed(&mut self) -> Vec<EntityId> {
        for fleet in self.fleets.values_mut() {
            fleet.remove_destroyed();
        }
        let dead: Vec<EntityId> = self
            .fleets
            .values()
            .filter(|f| !f.is_alive())
            .map(|f| f.id)
            .collect();
        for id in &dead {
            self.fleets.remove(id);
        }
        dead
    }

    pub fn to_json(&self) -> Result<String, WorldError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        Ok(serde_json::from_str(json)?)
    }
}
