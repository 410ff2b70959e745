//! Tag Registry - string labels for dynamically created entities.
//!
//! Scripts spawn fleets and later need to find them again after unrelated
//! simulation activity (combat, merging, losses) may have changed or removed
//! them. Instead of holding references, a script labels the fleet or one of
//! its inventory items and looks it up by label when needed.

use galaxy_rules::{EntityId, EntityKind, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::environment::World;

/// What a tag points at and who registered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub entity: EntityId,
    pub kind: EntityKind,
    /// Mission that created the tag and is responsible for releasing it.
    pub mission: String,
}

/// Index: tag -> tagged entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagRegistry {
    entries: BTreeMap<String, TagEntry>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `tag` to an entity, replacing any previous binding of the tag.
    pub fn tag(
        &mut self,
        tag: impl Into<String>,
        entity: EntityId,
        kind: EntityKind,
        mission: impl Into<String>,
    ) -> Option<TagEntry> {
        self.entries.insert(
            tag.into(),
            TagEntry {
                entity,
                kind,
                mission: mission.into(),
            },
        )
    }

    pub fn get(&self, tag: &str) -> Option<&TagEntry> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Forget a tag.
    pub fn release(&mut self, tag: &str) -> Option<TagEntry> {
        self.entries.remove(tag)
    }

    /// Forget every tag a mission registered; returns the released tags.
    pub fn release_owned_by(&mut self, mission: &str) -> Vec<String> {
        let owned: Vec<String> = self.owned_by(mission).map(str::to_string).collect();
        for tag in &owned {
            self.entries.remove(tag);
        }
        owned
    }

    /// Tags registered by a mission.
    pub fn owned_by<'a>(&'a self, mission: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.mission == mission)
            .map(|(tag, _)| tag.as_str())
    }

    /// Resolve a tag to the live fleet of `owner` that carries it.
    ///
    /// For item tags this is whichever fleet currently holds the item, so the
    /// lookup survives fleets being split, merged or recreated.
    pub fn find_fleet(&self, tag: &str, owner: &PlayerId, world: &dyn World) -> Option<EntityId> {
        let entry = self.entries.get(tag)?;
        let fleet = match entry.kind {
            EntityKind::Fleet => world.fleet(entry.entity)?,
            EntityKind::InventoryItem => world.fleet_with_item(entry.entity)?,
        };
        if &fleet.owner == owner && fleet.is_alive() {
            Some(fleet.id)
        } else {
            None
        }
    }

    /// Whether a tag's entity still exists in the world.
    pub fn is_live(entry: &TagEntry, world: &dyn World) -> bool {
        match entry.kind {
            EntityKind::Fleet => world.fleet(entry.entity).map_or(false, |f| f.is_alive()),
            EntityKind::InventoryItem => world
                .fleet_with_item(entry.entity)
                .and_then(|f| f.item(entry.entity))
                .map_or(false, |item| !item.is_destroyed()),
        }
    }

    /// Drop every tag whose entity is gone; returns the dropped tags.
    pub fn purge_stale(&mut self, world: &dyn World) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| !Self::is_live(entry, world))
            .map(|(tag, _)| tag.clone())
            .collect();
        for tag in &stale {
            debug!(tag = %tag, "stale_tag_purged");
            self.entries.remove(tag);
        }
        stale
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagEntry)> {
        self.entries.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_rules::{Player, Position, WorldState};

    fn world() -> (WorldState, PlayerId) {
        let mut state = WorldState::new();
        let owner = state.add_player(Player::new("Traders", "human", true));
        (state, owner)
    }

    #[test]
    fn test_tag_replaces_binding() {
        let mut registry = TagRegistry::new();
        let first = EntityId::new();
        let second = EntityId::new();

        assert!(registry.tag("X", first, EntityKind::Fleet, "M").is_none());
        let previous = registry.tag("X", second, EntityKind::Fleet, "M").unwrap();

        assert_eq!(previous.entity, first);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("X").unwrap().entity, second);
    }

    #[test]
    fn test_find_fleet_by_fleet_tag() {
        let (mut state, owner) = world();
        let fleet = state.create_fleet(&owner, "Convoy", Position::default());
        state.get_fleet_mut(fleet).unwrap().add_item("Freighter", 2);

        let mut registry = TagRegistry::new();
        registry.tag("Convoy", fleet, EntityKind::Fleet, "Escort");

        assert_eq!(registry.find_fleet("Convoy", &owner, &state), Some(fleet));
        assert_eq!(
            registry.find_fleet("Convoy", &PlayerId::from("Pirates"), &state),
            None
        );
        assert_eq!(registry.find_fleet("Unknown", &owner, &state), None);
    }

    #[test]
    fn test_item_tag_follows_the_item() {
        let (mut state, owner) = world();
        let first = state.create_fleet(&owner, "Convoy", Position::default());
        let item = state.get_fleet_mut(first).unwrap().add_item("Freighter", 1);

        let mut registry = TagRegistry::new();
        registry.tag("Cargo", item, EntityKind::InventoryItem, "Escort");

        // Move the item into a freshly created fleet, as a fleet merge would.
        let moved = state.get_fleet_mut(first).unwrap().remove_item(item).unwrap();
        let second = state.create_fleet(&owner, "Merged", Position::default());
        state.get_fleet_mut(second).unwrap().inventory.push(moved);
        state.remove_fleet(first);

        assert_eq!(registry.find_fleet("Cargo", &owner, &state), Some(second));
    }

    #[test]
    fn test_purge_stale() {
        let (mut state, owner) = world();
        let alive = state.create_fleet(&owner, "Alive", Position::default());
        state.get_fleet_mut(alive).unwrap().add_item("Freighter", 1);
        let doomed = state.create_fleet(&owner, "Doomed", Position::default());
        state.get_fleet_mut(doomed).unwrap().add_item("Freighter", 1);

        let mut registry = TagRegistry::new();
        registry.tag("Alive", alive, EntityKind::Fleet, "M");
        registry.tag("Doomed", doomed, EntityKind::Fleet, "M");
        state.remove_fleet(doomed);

        assert_eq!(registry.purge_stale(&state), vec!["Doomed".to_string()]);
        assert!(registry.contains("Alive"));
        assert!(!registry.contains("Doomed"));
    }

    #[test]
    fn test_release_owned_by() {
        let mut registry = TagRegistry::new();
        registry.tag("A", EntityId::new(), EntityKind::Fleet, "Escort");
        registry.tag("B", EntityId::new(), EntityKind::Fleet, "Escort");
        registry.tag("C", EntityId::new(), EntityKind::Fleet, "Siege");

        let released = registry.release_owned_by("Escort");
        assert_eq!(released, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(registry.owned_by("Escort").count(), 0);
        assert!(registry.contains("C"));
    }
}
