//! Merged encounters between an ally fleet and an enemy fleet.
//!
//! When the player engages either of two tagged fleets, both are pulled into
//! the same encounter, lined up on opposite sides, and retreat is disabled.
//! The setup is the same whichever fleet the player attacked and whichever
//! battle mode resolves it.

use galaxy_rules::{Battle, BattleMode, BattleSide, EntityId, PlayerId};
use tracing::info;

use super::MissionCtx;

const ALLY_DEPTH: f64 = 60.0;
const PLAYER_DEPTH: f64 = 160.0;
const ENEMY_DEPTH: f64 = 100.0;

/// Which of the two tagged fleets are still around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Survivors {
    pub ally: Option<EntityId>,
    pub enemy: Option<EntityId>,
}

/// Two tagged fleets that always fight together.
#[derive(Debug, Clone)]
pub struct JointBattle {
    pub ally_tag: String,
    pub ally_owner: PlayerId,
    pub enemy_tag: String,
    pub enemy_owner: PlayerId,
}

impl JointBattle {
    pub fn new(
        ally_tag: impl Into<String>,
        ally_owner: PlayerId,
        enemy_tag: impl Into<String>,
        enemy_owner: PlayerId,
    ) -> Self {
        Self {
            ally_tag: ally_tag.into(),
            ally_owner,
            enemy_tag: enemy_tag.into(),
            enemy_owner,
        }
    }

    /// Resolve both tags against the current world.
    pub fn survivors(&self, ctx: &MissionCtx<'_>) -> Survivors {
        Survivors {
            ally: ctx.find_tagged_fleet(&self.ally_tag, &self.ally_owner),
            enemy: ctx.find_tagged_fleet(&self.enemy_tag, &self.enemy_owner),
        }
    }

    /// Whether the encounter involves either tagged fleet.
    pub fn concerns(&self, ctx: &MissionCtx<'_>, battle: &Battle) -> bool {
        let fleets = self.survivors(ctx);
        [fleets.ally, fleets.enemy]
            .into_iter()
            .flatten()
            .any(|id| battle.involves(id))
    }

    /// Merge both fleets into the encounter and set up the battlefield.
    ///
    /// Returns `false`, leaving the battle untouched, when neither tagged
    /// fleet takes part.
    pub fn engage(&self, ctx: &MissionCtx<'_>, battle: &mut Battle) -> bool {
        if !self.concerns(ctx, battle) {
            return false;
        }
        let fleets = self.survivors(ctx);
        for id in [fleets.ally, fleets.enemy].into_iter().flatten() {
            if let Some(fleet) = ctx.world.fleet(id) {
                if !battle.merge_fleet(fleet) && battle.mode == BattleMode::Spacewar {
                    battle.place_fleet(fleet);
                }
            }
        }

        if battle.mode == BattleMode::Spacewar {
            let player = ctx.player();
            let player_fleets: Vec<EntityId> = battle
                .fleets
                .iter()
                .copied()
                .filter(|id| ctx.world.fleet(*id).map_or(false, |f| &f.owner == player))
                .collect();
            for id in player_fleets {
                if let Some(fleet) = ctx.world.fleet(id) {
                    battle.place_fleet(fleet);
                }
                battle.arrange_line(id, BattleSide::Left, PLAYER_DEPTH);
            }
            if let Some(ally) = fleets.ally {
                battle.arrange_line(ally, BattleSide::Left, ALLY_DEPTH);
            }
            if let Some(enemy) = fleets.enemy {
                battle.arrange_line(enemy, BattleSide::Right, ENEMY_DEPTH);
            }
        }
        battle.retreat_allowed = false;
        info!(
            mission = %ctx.mission(),
            mode = ?battle.mode,
            fleets = battle.fleets.len(),
            "joint_battle"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptConfig;
    use crate::data::{CampaignData, TextCatalog};
    use crate::environment::ScriptedPresentation;
    use crate::helper::ScriptingHelper;
    use crate::mission::MissionBase;
    use galaxy_rules::{BattleTarget, Player, Position, WorldState};
    use std::collections::BTreeSet;

    struct Setup {
        helper: ScriptingHelper,
        world: WorldState,
        presentation: ScriptedPresentation,
        text: TextCatalog,
        base: MissionBase,
        player_fleet: EntityId,
        ally: EntityId,
        enemy: EntityId,
    }

    fn setup() -> Setup {
        let mut world = WorldState::new();
        let empire = world.add_player(Player::new("Empire", "human", false));
        let traders = world.add_player(Player::new("Traders", "human", true));
        let pirates = world.add_player(Player::new("Pirates", "human", true));

        let player_fleet = world.create_fleet(&empire, "Guard", Position::new(10.0, 10.0));
        world.get_fleet_mut(player_fleet).unwrap().add_item("Fighter1", 3);
        let ally = world.create_fleet(&traders, "Convoy", Position::new(12.0, 10.0));
        world.get_fleet_mut(ally).unwrap().add_item("Freighter", 2);
        let enemy = world.create_fleet(&pirates, "Raiders", Position::new(14.0, 10.0));
        world.get_fleet_mut(enemy).unwrap().add_item("Fighter2", 4);

        let mut helper = ScriptingHelper::new(CampaignData::builtin().unwrap(), ScriptConfig::default());
        helper.tags_mut().tag("Test.Ally", ally, galaxy_rules::EntityKind::Fleet, "Test");
        helper.tags_mut().tag("Test.Enemy", enemy, galaxy_rules::EntityKind::Fleet, "Test");

        Setup {
            helper,
            world,
            presentation: ScriptedPresentation::new(),
            text: TextCatalog::default(),
            base: MissionBase::new("Test", empire),
            player_fleet,
            ally,
            enemy,
        }
    }

    fn joint() -> JointBattle {
        JointBattle::new(
            "Test.Ally",
            PlayerId::from("Traders"),
            "Test.Enemy",
            PlayerId::from("Pirates"),
        )
    }

    fn engaged(mode: BattleMode, attack_ally: bool) -> (Setup, Battle) {
        let mut s = setup();
        let target = if attack_ally { s.ally } else { s.enemy };
        let mut battle = Battle::new(mode, s.player_fleet, BattleTarget::Fleet(target));
        {
            let ctx = MissionCtx::new(&mut s.helper, &mut s.world, &mut s.presentation, &s.text, &s.base);
            assert!(joint().engage(&ctx, &mut battle));
        }
        (s, battle)
    }

    #[test]
    fn test_engage_is_symmetric() {
        let (s, via_ally) = engaged(BattleMode::Spacewar, true);
        let (t, via_enemy) = engaged(BattleMode::Spacewar, false);

        let a: BTreeSet<_> = via_ally.fleets.iter().copied().collect();
        let b: BTreeSet<_> = via_enemy.fleets.iter().copied().collect();
        assert_eq!(a, BTreeSet::from([s.player_fleet, s.ally, s.enemy]));
        assert_eq!(b, BTreeSet::from([t.player_fleet, t.ally, t.enemy]));
        assert!(!via_ally.retreat_allowed);
        assert!(!via_enemy.retreat_allowed);
        assert_eq!(via_ally.structures.len(), 3);
        assert_eq!(via_enemy.structures.len(), 3);

        for (battle, setup) in [(&via_ally, &s), (&via_enemy, &t)] {
            let ally_x = battle.structures_of(setup.ally).next().unwrap().x;
            let enemy_x = battle.structures_of(setup.enemy).next().unwrap().x;
            assert!(ally_x < enemy_x);
        }
    }

    #[test]
    fn test_autobattle_merges_without_structures() {
        let (s, battle) = engaged(BattleMode::Autobattle, false);
        assert!(battle.involves(s.ally));
        assert!(battle.involves(s.enemy));
        assert!(battle.structures.is_empty());
        assert!(!battle.retreat_allowed);
    }

    #[test]
    fn test_unrelated_battle_untouched() {
        let mut s = setup();
        let pirates = PlayerId::from("Pirates");
        let other = s.world.create_fleet(&pirates, "Other", Position::default());
        s.world.get_fleet_mut(other).unwrap().add_item("Fighter2", 1);
        let mut battle = Battle::new(BattleMode::Spacewar, s.player_fleet, BattleTarget::Fleet(other));
        let ctx = MissionCtx::new(&mut s.helper, &mut s.world, &mut s.presentation, &s.text, &s.base);
        assert!(!joint().engage(&ctx, &mut battle));
        assert!(battle.retreat_allowed);
        assert_eq!(battle.fleets.len(), 2);
    }

    #[test]
    fn test_survivors_follow_world() {
        let mut s = setup();
        s.world.remove_fleet(s.enemy);
        let ctx = MissionCtx::new(&mut s.helper, &mut s.world, &mut s.presentation, &s.text, &s.base);
        let survivors = joint().survivors(&ctx);
        assert_eq!(survivors.ally, Some(s.ally));
        assert_eq!(survivors.enemy, None);
    }
}
