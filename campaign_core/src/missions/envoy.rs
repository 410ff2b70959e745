//! Envoy - first contact with the Dargslan.
//!
//! Discovering their home world opens talks with an ambassador. A successful
//! talk makes them friendly; once the rest of level 2 is settled as well the
//! campaign is won.

use galaxy_rules::{PlanetId, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{defector, epidemic, siege, DARGSLAN};
use crate::error::Result;
use crate::mission::{load_record, save_record, set_stage, stage_label, Mission, MissionBase, MissionCtx, MissionRecord};
use crate::objectives::ObjectiveState;

const ID: &str = "Envoy";
pub(crate) const OBJECTIVE: &str = "Envoy.Talk";
const MESSAGE: &str = "Msg.Envoy";
const AGREEMENT: &str = "Msg.EnvoyAgreement";
const HOMEWORLD: &str = "Dargslan";
const AMBASSADOR: &str = "Dargslan.Ambassador";

const FRIENDLY_RELATION: i32 = 75;
const FINAL_LEVEL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Stage {
    #[default]
    None,
    Briefing,
    Run,
    Closing,
    Victory,
    Done,
}

#[derive(Debug, Serialize, Deserialize)]
enum Action {
    Greet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// Game hour the agreement was signed.
    signed_at: Option<u64>,
}

pub struct Envoy {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

impl Envoy {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    /// Every other level-2 storyline has been settled.
    fn level_settled(ctx: &MissionCtx<'_>) -> bool {
        let epidemic_running = ctx
            .helper
            .objective(epidemic::OBJECTIVE)
            .map_or(false, |o| o.visible && o.is_active());
        ctx.is_completed(defector::OBJECTIVE) && ctx.is_successful(siege::OBJECTIVE) && !epidemic_running
    }
}

impl Mission for Envoy {
    fn base(&self) -> &MissionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MissionBase {
        &mut self.base
    }

    fn applicable(&self, ctx: &MissionCtx<'_>) -> bool {
        ctx.level() >= 2 && ctx.has_player()
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
            Stage::Closing => {
                if ctx.hide_when_due(OBJECTIVE) {
                    set_stage(ID, &mut self.stage, Stage::Victory);
                }
            }
            Stage::Victory => {
                if Self::level_settled(ctx) {
                    ctx.world.set_level(FINAL_LEVEL);
                    set_stage(ID, &mut self.stage, Stage::Done);
                    ctx.win();
                }
            }
            _ => {}
        }
    }

    fn on_discovered(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {
        if self.stage == Stage::None && planet.as_str() == HOMEWORLD {
            set_stage(ID, &mut self.stage, Stage::Briefing);
            self.base.cutscene(ctx, MESSAGE, &Action::Greet);
        }
    }

    fn on_resume(&mut self, ctx: &mut MissionCtx<'_>, action: Value) {
        match ctx.decode::<Action>(action) {
            Some(Action::Greet) if self.stage == Stage::Briefing => {
                self.base.incoming_message(ctx, MESSAGE, &[OBJECTIVE]);
                set_stage(ID, &mut self.stage, Stage::Run);
            }
            _ => {}
        }
    }

    fn on_talk_completed(&mut self, ctx: &mut MissionCtx<'_>, person: &str) {
        if self.stage != Stage::Run || person != AMBASSADOR {
            return;
        }
        let player = ctx.player().clone();
        ctx.world
            .set_relation(&player, &PlayerId::from(DARGSLAN), FRIENDLY_RELATION);
        ctx.conclude_objective(OBJECTIVE, ObjectiveState::Success);
        self.aux.signed_at = Some(ctx.now());
        self.base.incoming_message(ctx, AGREEMENT, &[]);
        set_stage(ID, &mut self.stage, Stage::Closing);
    }
}
