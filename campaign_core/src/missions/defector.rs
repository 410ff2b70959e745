//! Defector - part of the player's own navy turns renegade.
//!
//! The renegade squadron needs an owner hostile to the player, so the
//! mission registers a temporary copy of the player for it. A loyal garrison
//! gives chase; any battle with either fleet pulls both in. However the chase
//! ends, the squadron and the temporary player are removed.

use galaxy_rules::{Battle, EntityId, FleetTask, PlanetId, PlayerId, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::mission::{
    load_record, save_record, set_stage, stage_label, JointBattle, Mission, MissionBase, MissionCtx, MissionRecord,
};
use crate::objectives::ObjectiveState;

const ID: &str = "Defector";
pub(crate) const OBJECTIVE: &str = "Defector.Intercept";
const MESSAGE: &str = "Msg.Defector";
const START: &str = "Defector.Start";
const ESCAPE: &str = "Defector.Escape";
const RENEGADES_TAG: &str = "Defector.Renegades";
const LOYALISTS_TAG: &str = "Defector.Loyalists";
const GARRISON: &str = "San Sterling";
const HAVEN: &str = "Naxos";

const START_DELAY_HOURS: u64 = 48;
const ESCAPE_HOURS: u64 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Stage {
    #[default]
    None,
    Wait,
    Briefing,
    Run,
    Closing,
    Done,
}

#[derive(Debug, Serialize, Deserialize)]
enum Action {
    Defect,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// The temporary player owning the renegades, while it exists.
    renegade: Option<PlayerId>,
    engaged: bool,
}

pub struct Defector {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

impl Defector {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    fn renegade_id(&self) -> PlayerId {
        PlayerId::new(format!("{}.Renegade", self.base.player()))
    }

    fn joint(&self, renegade: PlayerId) -> JointBattle {
        JointBattle::new(LOYALISTS_TAG, self.base.player().clone(), RENEGADES_TAG, renegade)
    }

    fn garrison_position(ctx: &MissionCtx<'_>) -> Position {
        ctx.world
            .planet(&PlanetId::from(GARRISON))
            .map(|p| p.position)
            .unwrap_or_default()
    }

    fn defect(&mut self, ctx: &mut MissionCtx<'_>) {
        let player = ctx.player().clone();
        let wanted = self.renegade_id();
        let renegade = if ctx.world.player(&wanted).is_some() {
            Some(wanted)
        } else {
            ctx.world.duplicate_player(&player, wanted)
        };
        let Some(renegade) = renegade else {
            warn!(mission = ID, "renegade_player_unavailable");
            ctx.conclude_objective(OBJECTIVE, ObjectiveState::Failure);
            set_stage(ID, &mut self.stage, Stage::Closing);
            return;
        };
        self.aux.renegade = Some(renegade.clone());

        let garrison = Self::garrison_position(ctx);
        let squadron = ctx.create_fleet(&renegade, "fleet.renegades", Position::new(garrison.x + 40.0, garrison.y));
        ctx.add_inventory(squadron, "Fighter2", 5);
        ctx.tag_fleet(squadron, RENEGADES_TAG);
        ctx.world
            .order_fleet(squadron, FleetTask::MoveToPlanet(PlanetId::from(HAVEN)));

        let loyalists = ctx.create_fleet(&player, "fleet.loyalists", garrison);
        ctx.add_inventory(loyalists, "Fighter2", 3);
        ctx.tag_fleet(loyalists, LOYALISTS_TAG);
        ctx.world.order_fleet(loyalists, FleetTask::Follow(squadron));

        ctx.add_mission(ESCAPE, ESCAPE_HOURS);
        self.base.incoming_message(ctx, MESSAGE, &[OBJECTIVE]);
        set_stage(ID, &mut self.stage, Stage::Run);
    }

    fn engage(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {
        if self.stage != Stage::Run {
            return;
        }
        if let Some(renegade) = self.aux.renegade.clone() {
            if self.joint(renegade).engage(ctx, battle) {
                self.aux.engaged = true;
            }
        }
    }

    fn battle_over(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {
        if self.stage != Stage::Run {
            return;
        }
        let concerned = self.aux.engaged
            || self
                .aux
                .renegade
                .clone()
                .map_or(false, |r| self.joint(r).concerns(ctx, battle));
        if concerned {
            self.settle(ctx);
        }
    }

    fn squadron(&self, ctx: &MissionCtx<'_>) -> Option<EntityId> {
        let renegade = self.aux.renegade.as_ref()?;
        ctx.find_tagged_fleet(RENEGADES_TAG, renegade)
    }

    /// The chase is over: the squadron is either destroyed or gets away.
    fn settle(&mut self, ctx: &mut MissionCtx<'_>) {
        self.aux.engaged = false;
        let escaped = self.squadron(ctx).is_some();
        let state = if escaped {
            ObjectiveState::Failure
        } else {
            ObjectiveState::Success
        };
        ctx.conclude_objective(OBJECTIVE, state);
        ctx.helper.clear_mission_times(|id| id == ESCAPE);

        let player = ctx.player().clone();
        ctx.order_tagged_fleet(LOYALISTS_TAG, &player, FleetTask::MoveToPlanet(PlanetId::from(GARRISON)));
        ctx.remove_tagged_fleet(RENEGADES_TAG);
        ctx.release_tags();
        if let Some(renegade) = self.aux.renegade.take() {
            ctx.world.remove_player(&renegade);
        }
        info!(mission = ID, escaped, "defector_settled");
        set_stage(ID, &mut self.stage, Stage::Closing);
    }
}

impl Mission for Defector {
    fn base(&self) -> &MissionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MissionBase {
        &mut self.base
    }

    fn applicable(&self, ctx: &MissionCtx<'_>) -> bool {
        ctx.level() == 2 && ctx.has_player()
    }

    fn stage_name(&self) -> String {
        stage_label(&self.stage)
    }

    fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    fn reset(&mut self) {
        self.base.reset();
        self.stage = Stage::None;
        self.aux = Aux::default();
    }

    fn save(&self) -> Result<MissionRecord> {
        save_record(&self.base, &self.stage, &self.aux)
    }

    fn load(&mut self, record: &MissionRecord) -> Result<()> {
        let (stage, aux) = load_record(&mut self.base, record)?;
        self.stage = stage;
        self.aux = aux;
        Ok(())
    }

    fn on_time(&mut self, ctx: &mut MissionCtx<'_>) {
        match self.stage {
            Stage::None => {
                ctx.add_mission(START, START_DELAY_HOURS);
                set_stage(ID, &mut self.stage, Stage::Wait);
            }
            Stage::Wait => {
                if ctx.check_mission(START) {
                    set_stage(ID, &mut self.stage, Stage::Briefing);
                    self.base.cutscene(ctx, MESSAGE, &Action::Defect);
                }
            }
            Stage::Briefing => {}
            Stage::Run => {
                if ctx.check_mission(ESCAPE) || self.squadron(ctx).is_none() {
                    self.settle(ctx);
                }
            }
            Stage::Closing => {
                if ctx.hide_when_due(OBJECTIVE) {
                    set_stage(ID, &mut self.stage, Stage::Done);
                }
            }
            Stage::Done => {}
        }
    }

    fn on_resume(&mut self, ctx: &mut MissionCtx<'_>, action: Value) {
        match ctx.decode::<Action>(action) {
            Some(Action::Defect) if self.stage == Stage::Briefing => self.defect(ctx),
            _ => {}
        }
    }

    fn on_fleet_at_planet(&mut self, ctx: &mut MissionCtx<'_>, fleet: EntityId, planet: &PlanetId) {
        if self.stage == Stage::Run && planet.as_str() == HAVEN && self.squadron(ctx) == Some(fleet) {
            self.settle(ctx);
        }
    }

    fn on_spacewar_start(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {
        self.engage(ctx, battle);
    }

    fn on_spacewar_finish(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {
        self.battle_over(ctx, battle);
    }

    fn on_autobattle_start(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {
        self.engage(ctx, battle);
    }

    fn on_autobattle_finish(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {
        self.battle_over(ctx, battle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WorldEvent;
    use crate::testing::Sandbox;
    use galaxy_rules::{BattleMode, BattleTarget, RELATION_HOSTILE};

    struct Chase {
        sandbox: Sandbox,
        squadron: EntityId,
        loyalists: EntityId,
    }

    fn renegade() -> PlayerId {
        PlayerId::from("Empire.Renegade")
    }

    fn chase() -> Chase {
        let mut sandbox = Sandbox::new();
        sandbox.world.level = 2;
        sandbox.tick();
        sandbox.advance_hours(START_DELAY_HOURS);
        assert_eq!(sandbox.stage(ID), "BRIEFING");
        sandbox.complete_playback();
        assert_eq!(sandbox.stage(ID), "RUN");
        let squadron = sandbox.fleet_named("Renegade squadron").unwrap();
        let loyalists = sandbox.fleet_named("Loyal garrison").unwrap();
        Chase {
            sandbox,
            squadron,
            loyalists,
        }
    }

    #[test]
    fn test_defection_spawns_hostile_copy() {
        let c = chase();
        let world = &c.sandbox.world;
        assert!(world.get_player(&renegade()).unwrap().ai);
        assert_eq!(world.relation(&PlayerId::from("Empire"), &renegade()), RELATION_HOSTILE);
        assert_eq!(world.get_fleet(c.squadron).unwrap().owner, renegade());
        assert_eq!(world.get_fleet(c.loyalists).unwrap().task, FleetTask::Follow(c.squadron));
        assert!(c.sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
    }

    #[test]
    fn test_intercept_succeeds() {
        let mut c = chase();
        let home = c.sandbox.home_fleet();
        let mut battle = Battle::new(BattleMode::Spacewar, home, BattleTarget::Fleet(c.squadron));
        c.sandbox.spacewar(&mut battle);
        assert!(battle.involves(c.loyalists));
        assert!(!battle.retreat_allowed);

        c.sandbox.destroy_fleet(c.squadron);
        c.sandbox.spacewar_done(&battle);

        assert!(c.sandbox.campaign.helper().is_successful(OBJECTIVE));
        assert!(c.sandbox.world.get_player(&renegade()).is_none());
        assert!(c.sandbox.world.get_fleet(c.squadron).is_none());
        assert!(c.sandbox.campaign.helper().tags().is_empty());
        assert!(!c.sandbox.campaign.helper().mission_times().contains(ESCAPE));
        assert_eq!(
            c.sandbox.world.get_fleet(c.loyalists).unwrap().task,
            FleetTask::MoveToPlanet(PlanetId::from(GARRISON))
        );
    }

    #[test]
    fn test_lost_battle_fails_and_cleans_up() {
        let mut c = chase();
        let loyalists = c.loyalists;
        let mut battle = Battle::new(BattleMode::Autobattle, c.squadron, BattleTarget::Fleet(loyalists));
        c.sandbox.autobattle(&mut battle);
        c.sandbox.destroy_fleet(loyalists);
        c.sandbox.autobattle_done(&battle);

        assert_eq!(
            c.sandbox.campaign.helper().objective_state(OBJECTIVE),
            Some(ObjectiveState::Failure)
        );
        assert!(c.sandbox.world.get_player(&renegade()).is_none());
        assert!(c.sandbox.world.get_fleet(c.squadron).is_none());
        assert!(c.sandbox.campaign.helper().tags().is_empty());
    }

    #[test]
    fn test_escape_by_deadline() {
        let mut c = chase();
        c.sandbox.advance_hours(ESCAPE_HOURS);
        assert_eq!(
            c.sandbox.campaign.helper().objective_state(OBJECTIVE),
            Some(ObjectiveState::Failure)
        );
        assert!(c.sandbox.world.get_player(&renegade()).is_none());
        assert_eq!(c.sandbox.stage(ID), "CLOSING");
    }

    #[test]
    fn test_escape_to_haven() {
        let mut c = chase();
        let squadron = c.squadron;
        c.sandbox.dispatch(WorldEvent::FleetAtPlanet {
            fleet: squadron,
            planet: PlanetId::from(HAVEN),
        });
        assert_eq!(
            c.sandbox.campaign.helper().objective_state(OBJECTIVE),
            Some(ObjectiveState::Failure)
        );
        assert!(c.sandbox.world.get_player(&renegade()).is_none());
    }

    #[test]
    fn test_reload_keeps_renegade_owner() {
        let c = chase();
        let mut reloaded = c.sandbox.reloaded();
        let record = reloaded.campaign.save().unwrap();
        assert_eq!(
            record.mission(ID).unwrap().aux.get("renegade"),
            Some(&Value::from("Empire.Renegade"))
        );

        reloaded.destroy_fleet(c.squadron);
        reloaded.tick();
        assert!(reloaded.campaign.helper().is_successful(OBJECTIVE));
        assert!(reloaded.world.get_player(&renegade()).is_none());
        reloaded.advance_ms(13_000);
        assert_eq!(reloaded.stage(ID), "DONE");
        assert_eq!(reloaded.campaign.helper().tags().owned_by(ID).count(), 0);
    }
}
