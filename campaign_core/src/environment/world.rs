//! `World` implementation for the in-memory `WorldState`.

use galaxy_rules::{
    EntityId, Fleet, FleetTask, Planet, PlanetId, Player, PlayerId, Position, Rect, WorldState,
};

use super::World;

impl World for WorldState {
    fn elapsed_hours(&self) -> u64 {
        self.elapsed_hours
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.get_player(id)
    }

    fn duplicate_player(&mut self, source: &PlayerId, new_id: PlayerId) -> Option<PlayerId> {
        WorldState::duplicate_player(self, source, new_id)
    }

    fn remove_player(&mut self, id: &PlayerId) -> bool {
        WorldState::remove_player(self, id).is_some()
    }

    fn set_view_limit(&mut self, player: &PlayerId, limit: Option<Rect>) {
        if let Some(p) = self.get_player_mut(player) {
            p.view_limit = limit;
        }
    }

    fn planet(&self, id: &PlanetId) -> Option<&Planet> {
        self.get_planet(id)
    }

    fn fleet(&self, id: EntityId) -> Option<&Fleet> {
        self.get_fleet(id)
    }

    fn fleets(&self) -> Box<dyn Iterator<Item = &Fleet> + '_> {
        Box::new(self.fleets.values())
    }

    fn fleet_with_item(&self, item: EntityId) -> Option<&Fleet> {
        WorldState::fleet_with_item(self, item)
    }

    fn create_fleet(&mut self, owner: &PlayerId, name: &str, position: Position) -> EntityId {
        WorldState::create_fleet(self, owner, name, position)
    }

    fn add_inventory(&mut self, fleet: EntityId, type_id: &str, count: u32) -> Option<EntityId> {
        self.get_fleet_mut(fleet).map(|f| f.add_item(type_id, count))
    }

    fn remove_fleet(&mut self, id: EntityId) -> bool {
        WorldState::remove_fleet(self, id).is_some()
    }

    fn order_fleet(&mut self, id: EntityId, task: FleetTask) -> bool {
        WorldState::order_fleet(self, id, task)
    }

    fn relation(&self, a: &PlayerId, b: &PlayerId) -> i32 {
        WorldState::relation(self, a, b)
    }

    fn set_relation(&mut self, a: &PlayerId, b: &PlayerId, value: i32) {
        WorldState::set_relation(self, a, b, value)
    }

    fn receive_message(&mut self, player: &PlayerId, message: &str) -> bool {
        WorldState::receive_message(self, player, message)
    }
}
