//! Fleet definitions.

use serde::{Deserialize, Serialize};

use super::{EntityId, FleetTask, InventoryItem, PlayerId, Position};

/// A group of ships moving together on the starmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub id: EntityId,
    pub owner: PlayerId,
    pub name: String,
    pub position: Position,
    pub inventory: Vec<InventoryItem>,
    pub task: FleetTask,
}

impl Fleet {
    /// Create a new, empty fleet for the given owner.
    pub fn new(owner: PlayerId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id: EntityId::new(),
            owner,
            name: name.into(),
            position,
            inventory: Vec::new(),
            task: FleetTask::Idle,
        }
    }

    /// A fleet without any surviving inventory no longer exists in the simulation.
    pub fn is_alive(&self) -> bool {
        self.inventory.iter().any(|item| !item.is_destroyed())
    }

    /// Check whether this fleet carries the given inventory item.
    pub fn has_item(&self, item: EntityId) -> bool {
        self.inventory.iter().any(|i| i.id == item)
    }

    pub fn item(&self, item: EntityId) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == item)
    }

    pub fn item_mut(&mut self, item: EntityId) -> Option<&mut InventoryItem> {
        self.inventory.iter_mut().find(|i| i.id == item)
    }

    /// Add ships to this fleet and return the new item stack's id.
    pub fn add_item(&mut self, type_id: impl Into<String>, count: u32) -> EntityId {
        let item = InventoryItem::new(type_id, self.owner.clone(), count);
        let id = item.id;
        self.inventory.push(item);
        id
    }

    /// Remove an item stack, returning it if present.
    pub fn remove_item(&mut self, item: EntityId) -> Option<InventoryItem> {
        let index = self.inventory.iter().position(|i| i.id == item)?;
        Some(self.inventory.remove(index))
    }

    /// Drop every destroyed item stack.
    pub fn remove_destroyed(&mut self) {
        self.inventory.retain(|item| !item.is_destroyed());
    }

    /// Total number of ships in the fleet.
    pub fn ship_count(&self) -> u32 {
        self.inventory.iter().map(|i| i.count).sum()
    }
}
