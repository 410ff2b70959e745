//! Siege - a Garthog fleet besieges San Sterling.
//!
//! The planet has to stay in the player's hands for two days. Losing it ends
//! the game.

use galaxy_rules::{FleetTask, PlanetId, PlayerId, Position, RELATION_HOSTILE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{defector, GARTHOG};
use crate::environment::SoundChannel;
use crate::error::Result;
use crate::mission::{load_record, save_record, set_stage, stage_label, Mission, MissionBase, MissionCtx, MissionRecord, NoAux};
use crate::objectives::ObjectiveState;

const ID: &str = "Siege";
pub(crate) const OBJECTIVE: &str = "Siege.Hold";
const MESSAGE: &str = "Msg.Siege";
const START: &str = "Siege.Start";
const RELIEF: &str = "Siege.Relief";
/// The flagship stack; follows the ships if the simulation regroups them.
const FLAGSHIP_TAG: &str = "Siege.Flagship";
/// The fleet the invasion was spawned into.
const INVADERS_TAG: &str = "Siege.Invaders";
const TARGET: &str = "San Sterling";
const ALERT: &str = "computer/invasion_alert";

const START_DELAY_HOURS: u64 = 24;
const HOLD_HOURS: u64 = 48;

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
    Invade,
}

pub struct Siege {
    base: MissionBase,
    stage: Stage,
}

impl Siege {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
        }
    }

    fn invade(&mut self, ctx: &mut MissionCtx<'_>) {
        let target = PlanetId::from(TARGET);
        let site = ctx
            .world
            .planet(&target)
            .map(|p| p.position)
            .unwrap_or_default();
        let garthog = PlayerId::from(GARTHOG);

        let invaders = ctx.create_fleet(&garthog, "fleet.invaders", Position::new(site.x + 150.0, site.y - 50.0));
        // Siege ships bypass the Garthog deployment limits.
        if let Some(flagship) = ctx.add_inventory(invaders, "GarthogDestroyer", 6) {
            ctx.tag_item(flagship, FLAGSHIP_TAG);
        }
        ctx.tag_fleet(invaders, INVADERS_TAG);
        ctx.add_inventory(invaders, "GarthogFighter", 10);
        ctx.world.order_fleet(invaders, FleetTask::AttackPlanet(target));

        let player = ctx.player().clone();
        ctx.world.set_relation(&player, &garthog, RELATION_HOSTILE);

        ctx.add_mission(RELIEF, HOLD_HOURS);
        let hours = HOLD_HOURS.to_string();
        let title = ctx.format("objective.siege.hold", &[TARGET, hours.as_str()]);
        info!(mission = ID, objective = %title, "siege_started");
        ctx.sound(SoundChannel::Computer, ALERT);
        self.base.urgent_message(ctx, MESSAGE, &[OBJECTIVE]);
        set_stage(ID, &mut self.stage, Stage::Run);
    }

    /// Remove the spawned fleet and wherever the flagship ended up.
    fn withdraw_invaders(ctx: &mut MissionCtx<'_>) {
        ctx.remove_tagged_fleet(FLAGSHIP_TAG);
        ctx.remove_tagged_fleet(INVADERS_TAG);
        ctx.release_tags();
    }
}

impl Mission for Siege {
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
    }

    fn save(&self) -> Result<MissionRecord> {
        save_record(&self.base, &self.stage, &NoAux {})
    }

    fn load(&mut self, record: &MissionRecord) -> Result<()> {
        let (stage, NoAux {}) = load_record(&mut self.base, record)?;
        self.stage = stage;
        Ok(())
    }

    fn on_time(&mut self, ctx: &mut MissionCtx<'_>) {
        match self.stage {
            Stage::None => {
                if ctx.is_completed(defector::OBJECTIVE) {
                    ctx.add_mission(START, START_DELAY_HOURS);
                    set_stage(ID, &mut self.stage, Stage::Wait);
                }
            }
            Stage::Wait => {
                if ctx.check_mission(START) {
                    set_stage(ID, &mut self.stage, Stage::Briefing);
                    self.base.cutscene(ctx, MESSAGE, &Action::Invade);
                }
            }
            Stage::Briefing => {}
            Stage::Run => {
                if ctx.check_mission(RELIEF) {
                    ctx.conclude_objective(OBJECTIVE, ObjectiveState::Success);
                    Self::withdraw_invaders(ctx);
                    set_stage(ID, &mut self.stage, Stage::Closing);
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
            Some(Action::Invade) if self.stage == Stage::Briefing => self.invade(ctx),
            _ => {}
        }
    }

    fn on_lost(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {
        if self.stage != Stage::Run || planet.as_str() != TARGET {
            return;
        }
        ctx.set_objective_state(OBJECTIVE, ObjectiveState::Failure);
        ctx.helper.clear_mission_times(|id| id == RELIEF);
        Self::withdraw_invaders(ctx);
        set_stage(ID, &mut self.stage, Stage::Done);
        ctx.gameover();
    }
}
