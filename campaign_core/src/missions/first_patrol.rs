//! First Patrol - the opening order of the campaign.
//!
//! Three days into the game command orders a patrol to Achilles. Any player
//! fleet arriving there within four days completes it. An arrival during the
//! briefing counts once the order is on screen.

use galaxy_rules::{EntityId, PlanetId, PlayerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::is_player_fleet;
use crate::error::Result;
use crate::mission::{load_record, save_record, set_stage, stage_label, Mission, MissionBase, MissionCtx, MissionRecord};
use crate::objectives::ObjectiveState;

const ID: &str = "FirstPatrol";
pub(crate) const OBJECTIVE: &str = "Patrol.Reach";
const MESSAGE: &str = "Msg.Patrol";
const START: &str = "FirstPatrol.Start";
const DEADLINE: &str = "FirstPatrol.Deadline";
const TARGET: &str = "Achilles";

const START_DELAY_HOURS: u64 = 72;
const DEADLINE_HOURS: u64 = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Stage {
    #[default]
    None,
    Wait,
    Run,
    Closing,
    Done,
}

#[derive(Debug, Serialize, Deserialize)]
enum Action {
    Brief,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Aux {
    /// A player fleet reached Achilles before the objective was revealed.
    arrived: bool,
}

pub struct FirstPatrol {
    base: MissionBase,
    stage: Stage,
    aux: Aux,
}

impl FirstPatrol {
    pub fn new(player: PlayerId) -> Self {
        Self {
            base: MissionBase::new(ID, player),
            stage: Stage::None,
            aux: Aux::default(),
        }
    }

    /// The patrol order is on screen.
    fn ordered(ctx: &MissionCtx<'_>) -> bool {
        ctx.helper.objective(OBJECTIVE).map_or(false, |o| o.visible)
    }

    fn conclude(&mut self, ctx: &mut MissionCtx<'_>, state: ObjectiveState) {
        ctx.conclude_objective(OBJECTIVE, state);
        ctx.helper.clear_mission_times(|id| id == DEADLINE);
        set_stage(ID, &mut self.stage, Stage::Closing);
    }
}

impl Mission for FirstPatrol {
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
                ctx.add_mission(START, START_DELAY_HOURS);
                set_stage(ID, &mut self.stage, Stage::Wait);
            }
            Stage::Wait => {
                if ctx.check_mission(START) {
                    set_stage(ID, &mut self.stage, Stage::Run);
                    ctx.add_mission(DEADLINE, DEADLINE_HOURS);
                    self.base.cutscene(ctx, MESSAGE, &Action::Brief);
                }
            }
            Stage::Run => {
                if ctx.check_mission(DEADLINE) {
                    self.conclude(ctx, ObjectiveState::Failure);
                } else if self.aux.arrived && Self::ordered(ctx) {
                    self.conclude(ctx, ObjectiveState::Success);
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
            Some(Action::Brief) if self.stage == Stage::Run => {
                self.base.incoming_message(ctx, MESSAGE, &[OBJECTIVE]);
            }
            _ => {}
        }
    }

    fn on_fleet_at_planet(&mut self, ctx: &mut MissionCtx<'_>, fleet: EntityId, planet: &PlanetId) {
        if self.stage != Stage::Run || planet.as_str() != TARGET || !is_player_fleet(ctx, fleet) {
            return;
        }
        if Self::ordered(ctx) {
            self.conclude(ctx, ObjectiveState::Success);
        } else {
            self.aux.arrived = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{GameSpeed, Presentation};
    use crate::events::WorldEvent;
    use crate::helper::hide_timeout_id;
    use crate::testing::Sandbox;

    fn running() -> Sandbox {
        let mut sandbox = Sandbox::new();
        sandbox.tick();
        sandbox.advance_hours(START_DELAY_HOURS);
        sandbox
    }

    fn arrive(sandbox: &mut Sandbox, fleet: EntityId) {
        sandbox.dispatch(WorldEvent::FleetAtPlanet {
            fleet,
            planet: PlanetId::from(TARGET),
        });
    }

    #[test]
    fn test_wait_fires_exactly_at_trigger() {
        let mut sandbox = Sandbox::new();
        sandbox.tick();
        assert_eq!(sandbox.stage(ID), "WAIT");
        assert_eq!(sandbox.campaign.helper().mission_times().get(START), Some(72));

        sandbox.advance_hours(71);
        assert_eq!(sandbox.stage(ID), "WAIT");
        assert!(sandbox.presentation.videos().is_empty());

        sandbox.advance_hours(1);
        assert_eq!(sandbox.stage(ID), "RUN");
        assert!(!sandbox.campaign.helper().mission_times().contains(START));
        assert_eq!(sandbox.presentation.videos(), vec!["messages/patrol"]);

        sandbox.tick();
        assert_eq!(sandbox.stage(ID), "RUN");
        assert_eq!(sandbox.presentation.videos().len(), 1);
    }

    #[test]
    fn test_briefing_slows_the_game_down() {
        let mut sandbox = Sandbox::new();
        sandbox.presentation.set_speed(GameSpeed::Faster);
        sandbox.tick();
        sandbox.advance_hours(START_DELAY_HOURS);
        assert_eq!(sandbox.presentation.speed(), GameSpeed::Normal);

        // Game time keeps running under the video.
        sandbox.advance_hours(1);
        assert_eq!(sandbox.presentation.speed(), GameSpeed::Normal);

        sandbox.complete_playback();
        assert_eq!(sandbox.presentation.speed(), GameSpeed::Faster);
        assert!(sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
    }

    #[test]
    fn test_briefing_reveals_objective() {
        let mut sandbox = running();
        assert!(!sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        sandbox.complete_playback();
        assert!(sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        assert_eq!(sandbox.presentation.messages(), vec![MESSAGE]);
    }

    #[test]
    fn test_player_fleet_reaching_achilles_succeeds() {
        let mut sandbox = running();
        sandbox.complete_playback();
        let home = sandbox.home_fleet();
        arrive(&mut sandbox, home);

        assert!(sandbox.campaign.helper().is_successful(OBJECTIVE));
        assert_eq!(sandbox.stage(ID), "CLOSING");
        assert!(!sandbox.campaign.helper().mission_times().contains(DEADLINE));
        assert_eq!(
            sandbox.campaign.helper().timeouts().remaining(&hide_timeout_id(OBJECTIVE)),
            Some(13_000)
        );

        // A second arrival changes nothing and does not restart the banner timer.
        sandbox.campaign.advance_timeouts(5_000);
        arrive(&mut sandbox, home);
        assert_eq!(
            sandbox.campaign.helper().timeouts().remaining(&hide_timeout_id(OBJECTIVE)),
            Some(8_000)
        );

        sandbox.advance_ms(8_000);
        assert_eq!(sandbox.stage(ID), "DONE");
        assert!(!sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
    }

    #[test]
    fn test_arrival_during_briefing_counts_after_reveal() {
        let mut sandbox = running();
        let home = sandbox.home_fleet();
        arrive(&mut sandbox, home);
        assert_eq!(sandbox.stage(ID), "RUN");
        assert!(!sandbox.campaign.helper().is_completed(OBJECTIVE));

        let mut sandbox = sandbox.reloaded();
        sandbox.complete_playback();
        sandbox.tick();
        assert!(sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        assert!(sandbox.campaign.helper().is_successful(OBJECTIVE));
        assert_eq!(sandbox.stage(ID), "CLOSING");
    }

    #[test]
    fn test_foreign_fleet_does_not_count() {
        let mut sandbox = running();
        let pirate = sandbox.world.create_fleet(
            &PlayerId::from("Pirates"),
            "Raider",
            galaxy_rules::Position::default(),
        );
        arrive(&mut sandbox, pirate);
        assert_eq!(sandbox.stage(ID), "RUN");
        assert!(!sandbox.campaign.helper().is_completed(OBJECTIVE));
    }

    #[test]
    fn test_deadline_fails() {
        let mut sandbox = running();
        sandbox.complete_playback();
        sandbox.advance_hours(DEADLINE_HOURS - 1);
        assert_eq!(sandbox.stage(ID), "RUN");
        sandbox.advance_hours(1);
        assert_eq!(
            sandbox.campaign.helper().objective_state(OBJECTIVE),
            Some(ObjectiveState::Failure)
        );
        assert_eq!(sandbox.stage(ID), "CLOSING");
    }

    #[test]
    fn test_message_seen_event_reveals() {
        let mut sandbox = running();
        let video = sandbox.presentation.complete_next().unwrap();
        sandbox.resume(video);
        assert!(!sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);

        sandbox.dispatch(WorldEvent::MessageSeen {
            message: MESSAGE.to_string(),
        });
        assert!(sandbox.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        assert!(sandbox.campaign.mission(ID).unwrap().base().pending_objectives().is_empty());

        // The presentation reporting the same acknowledgment later is a no-op.
        let message = sandbox.presentation.complete_next().unwrap();
        assert!(!sandbox.resume(message));
    }

    #[test]
    fn test_pending_reveal_survives_reload() {
        let mut sandbox = running();
        // Finish the video only; the briefing message stays unacknowledged.
        let video = sandbox.presentation.complete_next().unwrap();
        sandbox.resume(video);
        assert_eq!(sandbox.presentation.pending(), 1);

        let save = sandbox.campaign.save().unwrap();
        let record = save.mission(ID).unwrap();
        assert_eq!(record.pending_objectives.len(), 1);
        assert_eq!(record.pending_objectives[0].objectives, vec![OBJECTIVE.to_string()]);

        let mut reloaded = sandbox.reloaded();
        assert_eq!(reloaded.stage(ID), "RUN");
        assert!(!reloaded.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        assert_eq!(reloaded.presentation.messages(), vec![MESSAGE]);

        reloaded.complete_playback();
        assert!(reloaded.campaign.helper().objective(OBJECTIVE).unwrap().visible);
        assert!(reloaded
            .campaign
            .save()
            .unwrap()
            .mission(ID)
            .unwrap()
            .pending_objectives
            .is_empty());
    }
}
