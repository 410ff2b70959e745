//! Epidemic - a plague breaks out on one of the player's planets.

use galaxy_rules::{PlanetId, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::mission::{load_record, save_record, set_stage, stage_label, Mission, MissionBase, MissionCtx, MissionRecord};
use crate::objectives::ObjectiveState;

const ID: &str = "Epidemic";
pub(crate) const OBJECTIVE: &str = "Epidemic.Cure";
const MESSAGE: &str = "Msg.Epidemic";
const DEADLINE: &str = "Epidemic.Deadline";
const DEADLINE_HOURS: u64 = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Stage {
    #[default]
    None,
    Run,
    Closing,
    Done,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// The infected planet.
    planet: Option<PlanetId>,
}

pub struct Epidemic {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

impl Epidemic {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    fn is_outbreak(&self, planet: &PlanetId) -> bool {
        self.aux.planet.as_ref() == Some(planet)
    }

    fn conclude(&mut self, ctx: &mut MissionCtx<'_>, state: ObjectiveState) {
        ctx.conclude_objective(OBJECTIVE, state);
        ctx.helper.clear_mission_times(|id| id == DEADLINE);
        set_stage(ID, &mut self.stage, Stage::Closing);
    }
}

impl Mission for Epidemic {
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
            Stage::None | Stage::Done => {}
            Stage::Run => {
                if ctx.check_mission(DEADLINE) {
                    self.conclude(ctx, ObjectiveState::Failure);
                    return;
                }
                // Cured while no event reached us, e.g. across a reload.
                let cured = self
                    .aux
                    .planet
                    .as_ref()
                    .and_then(|id| ctx.world.planet(id))
                    .map_or(false, |p| !p.infected);
                if cured {
                    self.conclude(ctx, ObjectiveState::Success);
                }
            }
            Stage::Closing => {
                if ctx.hide_when_due(OBJECTIVE) {
                    set_stage(ID, &mut self.stage, Stage::Done);
                }
            }
        }
    }

    fn on_planet_infected(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {
        if self.stage != Stage::None {
            return;
        }
        let owned = ctx
            .world
            .planet(planet)
            .map_or(false, |p| p.is_owned_by(ctx.player()));
        if !owned {
            return;
        }
        self.aux.planet = Some(planet.clone());
        let headline = ctx.format("message.epidemic", &[planet.as_str()]);
        info!(mission = ID, planet = %planet, headline = %headline, "outbreak");
        ctx.add_mission(DEADLINE, DEADLINE_HOURS);
        self.base.incoming_message(ctx, MESSAGE, &[OBJECTIVE]);
        set_stage(ID, &mut self.stage, Stage::Run);
    }

    fn on_planet_cured(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {
        if self.stage == Stage::Run && self.is_outbreak(planet) {
            self.conclude(ctx, ObjectiveState::Success);
        }
    }

    fn on_lost(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {
        if self.stage == Stage::Run && self.is_outbreak(planet) {
            self.conclude(ctx, ObjectiveState::Failure);
        }
    }
}
