//! Promotion - closes level 1 once both of its objectives are completed.
//!
//! Raising the level purges whatever level-1 bookkeeping is left: timers,
//! banners, and the fleets the level-1 missions spawned along with their tags. The same purge runs when the
//! level is raised by other means, such as a skipped chapter.

use galaxy_rules::PlayerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{first_patrol, merchant_escort};
use crate::error::Result;
use crate::mission::{load_record, save_record, set_stage, stage_label, Mission, MissionBase, MissionCtx, MissionRecord};

const ID: &str = "Promotion";
const MESSAGE: &str = "Msg.Promotion";
const START: &str = "Promotion.Start";
const START_DELAY_HOURS: u64 = 12;
const NEXT_LEVEL: u32 = 2;

/// Id prefixes of level-1 objectives and timers.
const LEVEL_ONE_PREFIXES: [&str; 4] = ["Patrol.", "Escort.", "FirstPatrol.", "MerchantEscort."];
const LEVEL_ONE_MISSIONS: [&str; 2] = ["FirstPatrol", "MerchantEscort"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Stage {
    #[default]
    None,
    Wait,
    Briefing,
    Done,
}

#[derive(Debug, Serialize, Deserialize)]
enum Action {
    Promote,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// Game hour of the promotion, if it happened through the story.
    promoted_at: Option<u64>,
}

pub struct Promotion {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

fn is_level_one(id: &str) -> bool {
    LEVEL_ONE_PREFIXES.iter().any(|prefix| id.starts_with(prefix))
}

impl Promotion {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    fn promote(&mut self, ctx: &mut MissionCtx<'_>) {
        ctx.world.set_level(NEXT_LEVEL);
        self.aux.promoted_at = Some(ctx.now());
        self.enter_next_level(ctx);
        self.base.incoming_message(ctx, MESSAGE, &[]);
    }

    /// Purge level-1 leftovers and open up the level-2 map.
    fn enter_next_level(&mut self, ctx: &mut MissionCtx<'_>) {
        let times = ctx.helper.clear_mission_times(is_level_one);
        let timeouts = ctx.helper.clear_timeouts(is_level_one);
        let objectives = ctx.helper.clear_objectives(is_level_one);
        let mut leftover: Vec<String> = Vec::new();
        for mission in LEVEL_ONE_MISSIONS {
            leftover.extend(ctx.helper.tags().owned_by(mission).map(String::from));
        }
        let mut fleets = 0;
        for tag in &leftover {
            if ctx.remove_tagged_fleet(tag) {
                fleets += 1;
            }
        }
        let tags = leftover.len();
        let limit = ctx.helper.view_limit(NEXT_LEVEL);
        let player = ctx.player().clone();
        ctx.world.set_view_limit(&player, limit);
        info!(
            mission = ID,
            times,
            timeouts,
            objectives,
            tags,
            fleets,
            "level_one_purged"
        );
        set_stage(ID, &mut self.stage, Stage::Done);
    }
}

impl Mission for Promotion {
    fn base(&self) -> &MissionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MissionBase {
        &mut self.base
    }

    fn applicable(&self, ctx: &MissionCtx<'_>) -> bool {
        ctx.has_player() && (ctx.level() == 1 || self.stage != Stage::Done)
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
        if ctx.level() >= NEXT_LEVEL {
            if self.stage != Stage::Done {
                self.enter_next_level(ctx);
            }
            return;
        }
        match self.stage {
            Stage::None => {
                if ctx.is_completed(first_patrol::OBJECTIVE) && ctx.is_completed(merchant_escort::OBJECTIVE) {
                    ctx.add_mission(START, START_DELAY_HOURS);
                    set_stage(ID, &mut self.stage, Stage::Wait);
                }
            }
            Stage::Wait => {
                if ctx.check_mission(START) {
                    set_stage(ID, &mut self.stage, Stage::Briefing);
                    self.base.cutscene(ctx, MESSAGE, &Action::Promote);
                }
            }
            Stage::Briefing | Stage::Done => {}
        }
    }

    fn on_resume(&mut self, ctx: &mut MissionCtx<'_>, action: Value) {
        match ctx.decode::<Action>(action) {
            Some(Action::Promote) if self.stage == Stage::Briefing => self.promote(ctx),
            _ => {}
        }
    }

    fn on_level_changed(&mut self, ctx: &mut MissionCtx<'_>, level: u32) {
        if level >= NEXT_LEVEL && self.stage != Stage::Done {
            self.enter_next_level(ctx);
        }
    }
}
