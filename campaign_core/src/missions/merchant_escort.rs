//! Merchant Escort - pirates ambush a merchant convoy near Achilles.
//!
//! The convoy and the raiders fight as one battle whichever of them the
//! player engages. If the convoy survives it continues to Naxos.

use galaxy_rules::{Battle, FleetTask, PlanetId, PlayerId, Position, RELATION_ALLIED, RELATION_HOSTILE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{first_patrol, PIRATES, TRADERS};
use crate::error::Result;
use crate::mission::{
    load_record, save_record, set_stage, stage_label, JointBattle, Mission, MissionBase, MissionCtx, MissionRecord,
};
use crate::objectives::ObjectiveState;

const ID: &str = "MerchantEscort";
pub(crate) const OBJECTIVE: &str = "Escort.Protect";
const MESSAGE: &str = "Msg.Escort";
const THANKS: &str = "Msg.EscortThanks";
const START: &str = "MerchantEscort.Start";
const TRADER_TAG: &str = "Escort.Trader";
const PIRATES_TAG: &str = "Escort.Pirates";
const AMBUSH_SITE: &str = "Achilles";
const DESTINATION: &str = "Naxos";

const START_DELAY_HOURS: u64 = 24;

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
    Ambush,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// A battle involving the convoy or the raiders is being fought.
    engaged: bool,
}

pub struct MerchantEscort {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

impl MerchantEscort {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    fn joint() -> JointBattle {
        JointBattle::new(
            TRADER_TAG,
            PlayerId::from(TRADERS),
            PIRATES_TAG,
            PlayerId::from(PIRATES),
        )
    }

    fn ambush(&mut self, ctx: &mut MissionCtx<'_>) {
        let site = ctx
            .world
            .planet(&PlanetId::from(AMBUSH_SITE))
            .map(|p| p.position)
            .unwrap_or_default();
        let traders = PlayerId::from(TRADERS);
        let pirates = PlayerId::from(PIRATES);

        let convoy = ctx.create_fleet(&traders, "fleet.trader", Position::new(site.x + 20.0, site.y));
        ctx.add_inventory(convoy, "TradersFreight1", 3);
        ctx.tag_fleet(convoy, TRADER_TAG);

        let raiders = ctx.create_fleet(&pirates, "fleet.pirates", Position::new(site.x + 60.0, site.y + 20.0));
        if let Some(item) = ctx.add_inventory(raiders, "PiratesFighter", 4) {
            ctx.tag_item(item, PIRATES_TAG);
        }
        ctx.world.order_fleet(raiders, FleetTask::Attack(convoy));

        let player = ctx.player().clone();
        ctx.world.set_relation(&player, &traders, RELATION_ALLIED);
        ctx.world.set_relation(&player, &pirates, RELATION_HOSTILE);

        self.base.incoming_message(ctx, MESSAGE, &[OBJECTIVE]);
        set_stage(ID, &mut self.stage, Stage::Run);
    }

    fn engage(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {
        if self.stage == Stage::Run && Self::joint().engage(ctx, battle) {
            self.aux.engaged = true;
        }
    }

    fn battle_over(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {
        if self.stage == Stage::Run && (self.aux.engaged || Self::joint().concerns(ctx, battle)) {
            self.settle(ctx);
        }
    }

    /// Decide the outcome from whichever tagged fleets are still alive.
    fn settle(&mut self, ctx: &mut MissionCtx<'_>) {
        self.aux.engaged = false;
        let survivors = Self::joint().survivors(ctx);
        match survivors.ally {
            Some(convoy) => {
                ctx.conclude_objective(OBJECTIVE, ObjectiveState::Success);
                ctx.world
                    .order_fleet(convoy, FleetTask::MoveToPlanet(PlanetId::from(DESTINATION)));
                self.base.incoming_message(ctx, THANKS, &[]);
            }
            None => {
                ctx.conclude_objective(OBJECTIVE, ObjectiveState::Failure);
            }
        }
        let removed = ctx.remove_tagged_fleet(PIRATES_TAG);
        ctx.release_tags();
        info!(mission = ID, convoy_alive = survivors.ally.is_some(), raiders_removed = removed, "escort_settled");
        set_stage(ID, &mut self.stage, Stage::Closing);
    }
}

impl Mission for MerchantEscort {
    fn base(&self) -> &MissionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MissionBase {
        &mut self.base
    }

    fn applicable(&self, ctx: &MissionCtx<'_>) -> bool {
        ctx.level() == 1 && ctx.has_player()
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
                if ctx.is_completed(first_patrol::OBJECTIVE) {
                    ctx.add_mission(START, START_DELAY_HOURS);
                    set_stage(ID, &mut self.stage, Stage::Wait);
                }
            }
            Stage::Wait => {
                if ctx.check_mission(START) {
                    set_stage(ID, &mut self.stage, Stage::Briefing);
                    self.base.cutscene(ctx, MESSAGE, &Action::Ambush);
                }
            }
            Stage::Briefing => {}
            Stage::Run => {
                // Either side vanishing outside a scripted battle settles it too.
                let survivors = Self::joint().survivors(ctx);
                if survivors.ally.is_none() || survivors.enemy.is_none() {
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
            Some(Action::Ambush) if self.stage == Stage::Briefing => self.ambush(ctx),
            _ => {}
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
