//! Battle mechanics: how an encounter is described to the scripting layer.
//!
//! Resolving a battle (damage, strength, movement) is the simulation's job.
//! This module only describes who takes part, where the structures stand and
//! who won, so scripts can reshape an encounter before it starts and read its
//! outcome afterwards.

use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, Fleet, PlanetId, PlayerId};

/// The two ways the simulation resolves an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleMode {
    /// Interactive, structure-by-structure space battle.
    Spacewar,
    /// Abstracted instant resolution.
    Autobattle,
}

/// What the attacking fleet engaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleTarget {
    Fleet(EntityId),
    Planet(PlanetId),
}

/// Which side of the battlefield a structure fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleSide {
    Left,
    Right,
}

/// A ship stack placed on the spacewar battlefield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacewarStructure {
    pub item: EntityId,
    pub fleet: EntityId,
    pub owner: PlayerId,
    pub x: f64,
    pub y: f64,
    /// Facing in radians; 0 points right.
    pub angle: f64,
}

/// Battlefield width used when laying out formations.
pub const BATTLEFIELD_WIDTH: f64 = 1000.0;
/// Battlefield height used when laying out formations.
pub const BATTLEFIELD_HEIGHT: f64 = 600.0;

/// An encounter between fleets (and possibly a planet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub mode: BattleMode,
    pub attacker: EntityId,
    pub target: BattleTarget,
    /// Every fleet taking part, attacker and target included.
    pub fleets: Vec<EntityId>,
    /// Battlefield layout; only populated for spacewar.
    pub structures: Vec<SpacewarStructure>,
    pub retreat_allowed: bool,
    /// Set by the simulation once the encounter is resolved.
    pub winner: Option<PlayerId>,
}

impl Battle {
    /// Describe a new encounter between an attacking fleet and its target.
    pub fn new(mode: BattleMode, attacker: EntityId, target: BattleTarget) -> Self {
        let mut fleets = vec![attacker];
        if let BattleTarget::Fleet(id) = &target {
            fleets.push(*id);
        }
        Self {
            mode,
            attacker,
            target,
            fleets,
            structures: Vec::new(),
            retreat_allowed: true,
            winner: None,
        }
    }

    /// Check if a fleet takes part in this encounter.
    pub fn involves(&self, fleet: EntityId) -> bool {
        self.fleets.contains(&fleet)
    }

    /// The fleet the attacker engaged, if the target is a fleet.
    pub fn target_fleet(&self) -> Option<EntityId> {
        match self.target {
            BattleTarget::Fleet(id) => Some(id),
            BattleTarget::Planet(_) => None,
        }
    }

    /// Pull a fleet into the encounter.
    ///
    /// For spacewar battles the fleet's surviving inventory is also placed on
    /// the battlefield. Returns `false` if the fleet was already involved.
    pub fn merge_fleet(&mut self, fleet: &Fleet) -> bool {
        if self.involves(fleet.id) {
            return false;
        }
        self.fleets.push(fleet.id);
        if self.mode == BattleMode::Spacewar {
            self.place_fleet(fleet);
        }
        true
    }

    /// Put a fleet's surviving inventory on the battlefield (spacewar only).
    pub fn place_fleet(&mut self, fleet: &Fleet) {
        for item in fleet.inventory.iter().filter(|i| !i.is_destroyed()) {
            if self.structures.iter().any(|s| s.item == item.id) {
                continue;
            }
            self.structures.push(SpacewarStructure {
                item: item.id,
                fleet: fleet.id,
                owner: fleet.owner.clone(),
                x: 0.0,
                y: 0.0,
                angle: 0.0,
            });
        }
    }

    /// Structures belonging to one fleet.
    pub fn structures_of(&self, fleet: EntityId) -> impl Iterator<Item = &SpacewarStructure> {
        self.structures.iter().filter(move |s| s.fleet == fleet)
    }

    /// Line up a fleet's structures in a vertical column on one side of the field.
    ///
    /// `depth` is the distance from that side's edge.
    pub fn arrange_line(&mut self, fleet: EntityId, side: BattleSide, depth: f64) {
        let count = self.structures.iter().filter(|s| s.fleet == fleet).count();
        if count == 0 {
            return;
        }
        let spacing = BATTLEFIELD_HEIGHT / (count as f64 + 1.0);
        let (x, angle) = match side {
            BattleSide::Left => (depth, 0.0),
            BattleSide::Right => (BATTLEFIELD_WIDTH - depth, std::f64::consts::PI),
        };
        for (index, structure) in self
            .structures
            .iter_mut()
            .filter(|s| s.fleet == fleet)
            .enumerate()
        {
            structure.x = x;
            structure.y = spacing * (index as f64 + 1.0);
            structure.angle = angle;
        }
    }
}

/// Diplomatic relation value meaning "at war".
pub const RELATION_HOSTILE: i32 = 0;
/// Diplomatic relation value meaning "neutral".
pub const RELATION_NEUTRAL: i32 = 50;
/// Diplomatic relation value meaning "allied".
pub const RELATION_ALLIED: i32 = 100;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Position;

    fn fleet(owner: &str, ships: u32) -> Fleet {
        let mut fleet = Fleet::new(PlayerId::from(owner), owner, Position::default());
        for _ in 0..ships {
            fleet.add_item("Fighter1", 1);
        }
        fleet
    }

    #[test]
    fn test_new_battle_involves_target_fleet() {
        let a = EntityId::new();
        let b = EntityId::new();
        let battle = Battle::new(BattleMode::Autobattle, a, BattleTarget::Fleet(b));
        assert!(battle.involves(a));
        assert!(battle.involves(b));
        assert_eq!(battle.target_fleet(), Some(b));
        assert!(battle.retreat_allowed);
    }

    #[test]
    fn test_merge_fleet_places_structures_in_spacewar() {
        let attacker = fleet("Empire", 2);
        let ally = fleet("Traders", 3);
        let mut battle = Battle::new(
            BattleMode::Spacewar,
            attacker.id,
            BattleTarget::Planet(PlanetId::from("Achilles")),
        );
        battle.place_fleet(&attacker);

        assert!(battle.merge_fleet(&ally));
        assert!(!battle.merge_fleet(&ally));
        assert_eq!(battle.structures.len(), 5);
        assert_eq!(battle.structures_of(ally.id).count(), 3);
    }

    #[test]
    fn test_merge_fleet_autobattle_has_no_structures() {
        let attacker = fleet("Empire", 1);
        let ally = fleet("Traders", 1);
        let mut battle = Battle::new(
            BattleMode::Autobattle,
            attacker.id,
            BattleTarget::Planet(PlanetId::from("Achilles")),
        );
        battle.merge_fleet(&ally);
        assert!(battle.involves(ally.id));
        assert!(battle.structures.is_empty());
    }

    #[test]
    fn test_arrange_line() {
        let enemy = fleet("Pirates", 2);
        let mut battle = Battle::new(
            BattleMode::Spacewar,
            EntityId::new(),
            BattleTarget::Fleet(enemy.id),
        );
        battle.place_fleet(&enemy);
        battle.arrange_line(enemy.id, BattleSide::Right, 100.0);

        let ys: Vec<f64> = battle.structures_of(enemy.id).map(|s| s.y).collect();
        assert_eq!(ys, vec![200.0, 400.0]);
        assert!(battle
            .structures_of(enemy.id)
            .all(|s| (s.x - 900.0).abs() < 1e-9));
    }
}
