//! Campaign - broadcasts world events to the missions and owns their shared state.
//!
//! Every entry point takes a [`Host`] for the duration of the call. Missions
//! whose `applicable` check fails are skipped for every broadcast, including
//! the periodic tick.

use galaxy_rules::{Battle, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ScriptConfig;
use crate::data::CampaignData;
use crate::diagnostics::DiagnosticKind;
use crate::environment::Host;
use crate::error::Result;
use crate::events::WorldEvent;
use crate::helper::ScriptingHelper;
use crate::mission::{Continuation, Mission, MissionCtx, MissionRecord, Resume};
use crate::missions::story_missions;
use crate::objectives::Objective;
use crate::tags::TagRegistry;
use crate::timers::{MissionTimes, Timeouts};

/// Everything the scripting layer persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignSave {
    pub missions: Vec<MissionRecord>,
    pub objectives: Vec<Objective>,
    pub mission_times: MissionTimes,
    pub timeouts: Timeouts,
    pub tags: TagRegistry,
}

impl CampaignSave {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn mission(&self, id: &str) -> Option<&MissionRecord> {
        self.missions.iter().find(|r| r.mission_id == id)
    }
}

/// The mission dispatcher.
pub struct Campaign {
    helper: ScriptingHelper,
    missions: Vec<Box<dyn Mission>>,
}

impl Campaign {
    pub fn new(data: CampaignData, config: ScriptConfig, missions: Vec<Box<dyn Mission>>) -> Self {
        Self {
            helper: ScriptingHelper::new(data, config),
            missions,
        }
    }

    /// The built-in story missions scripted for `player`.
    pub fn story(data: CampaignData, config: ScriptConfig, player: PlayerId) -> Self {
        Self::new(data, config, story_missions(player))
    }

    pub fn helper(&self) -> &ScriptingHelper {
        &self.helper
    }

    pub fn helper_mut(&mut self) -> &mut ScriptingHelper {
        &mut self.helper
    }

    pub fn missions(&self) -> impl Iterator<Item = &dyn Mission> {
        self.missions.iter().map(|m| &**m)
    }

    pub fn mission(&self, id: &str) -> Option<&dyn Mission> {
        self.missions().find(|m| m.id() == id)
    }

    /// Run `handler` on every applicable mission, in registration order.
    fn each_applicable<F>(&mut self, host: &mut Host<'_>, mut handler: F)
    where
        F: FnMut(&mut dyn Mission, &mut MissionCtx<'_>),
    {
        for mission in self.missions.iter_mut() {
            {
                let mut ctx = MissionCtx::from_host(&mut self.helper, host, mission.base());
                if !mission.applicable(&ctx) {
                    continue;
                }
                handler(&mut **mission, &mut ctx);
            }
            release_leaked_tags(&mut self.helper, &**mission);
        }
    }

    /// One simulation tick: purge stale tags, then poll every mission.
    pub fn tick(&mut self, host: &mut Host<'_>) {
        let stale = self.helper.tags_mut().purge_stale(&*host.world);
        if !stale.is_empty() {
            debug!(count = stale.len(), "stale_tags_purged");
        }
        self.each_applicable(host, |mission, ctx| mission.on_time(ctx));
    }

    /// Count down real-time timeouts. Missions observe them on the next tick.
    pub fn advance_timeouts(&mut self, elapsed_ms: u64) {
        self.helper.advance_timeouts(elapsed_ms);
    }

    /// Relay a world event to every applicable mission.
    pub fn dispatch(&mut self, host: &mut Host<'_>, event: &WorldEvent) {
        debug!(event = event.name(), "dispatch");
        self.each_applicable(host, |mission, ctx| match event {
            WorldEvent::FleetAt { fleet, position } => mission.on_fleet_at(ctx, *fleet, *position),
            WorldEvent::FleetAtPlanet { fleet, planet } => mission.on_fleet_at_planet(ctx, *fleet, planet),
            WorldEvent::FleetAtFleet { fleet, other } => mission.on_fleet_at_fleet(ctx, *fleet, *other),
            WorldEvent::Conquered {
                planet,
                previous_owner,
            } => mission.on_conquered(ctx, planet, previous_owner.as_ref()),
            WorldEvent::Lost { planet } => mission.on_lost(ctx, planet),
            WorldEvent::Discovered { planet } => mission.on_discovered(ctx, planet),
            WorldEvent::MessageSeen { message } => {
                mission.base_mut().reveal(ctx, message);
                mission.on_message_seen(ctx, message);
            }
            WorldEvent::TalkCompleted { person } => mission.on_talk_completed(ctx, person),
            WorldEvent::PlanetInfected { planet } => mission.on_planet_infected(ctx, planet),
            WorldEvent::PlanetCured { planet } => mission.on_planet_cured(ctx, planet),
            WorldEvent::LevelChanged { level } => mission.on_level_changed(ctx, *level),
            WorldEvent::Loaded => mission.on_loaded(ctx),
        });
    }

    /// An interactive battle is about to start; missions may reshape it.
    pub fn spacewar_start(&mut self, host: &mut Host<'_>, battle: &mut Battle) {
        self.each_applicable(host, |mission, ctx| mission.on_spacewar_start(ctx, battle));
    }

    pub fn spacewar_finish(&mut self, host: &mut Host<'_>, battle: &Battle) {
        self.each_applicable(host, |mission, ctx| mission.on_spacewar_finish(ctx, battle));
    }

    /// An instantly resolved battle is about to start; missions may reshape it.
    pub fn autobattle_start(&mut self, host: &mut Host<'_>, battle: &mut Battle) {
        self.each_applicable(host, |mission, ctx| mission.on_autobattle_start(ctx, battle));
    }

    pub fn autobattle_finish(&mut self, host: &mut Host<'_>, battle: &Battle) {
        self.each_applicable(host, |mission, ctx| mission.on_autobattle_finish(ctx, battle));
    }

    /// Hand back a continuation whose playback completed.
    ///
    /// Returns `true` if the continuation was still outstanding and ran.
    pub fn resume(&mut self, host: &mut Host<'_>, continuation: Continuation) -> bool {
        // Playback is over whether or not the continuation still matters.
        if let Some(after) = continuation.after {
            after.apply(&mut *host.presentation);
        }
        let resume_inapplicable = self.helper.config().resume_inapplicable;
        let Some(mission) = self
            .missions
            .iter_mut()
            .find(|m| m.id() == continuation.mission)
        else {
            self.helper
                .report(DiagnosticKind::MissingMission, &continuation.mission);
            return false;
        };

        let ran = {
            let mut ctx = MissionCtx::from_host(&mut self.helper, host, mission.base());
            if !resume_inapplicable && !mission.applicable(&ctx) {
                debug!(mission = %continuation.mission, "continuation_skipped");
                return false;
            }
            match continuation.resume {
                Resume::Reveal { message } => mission.base_mut().reveal(&mut ctx, &message),
                Resume::Action(action) => {
                    if mission.base_mut().take_deferred(&action) {
                        mission.on_resume(&mut ctx, action);
                        true
                    } else {
                        debug!(mission = %continuation.mission, "continuation_obsolete");
                        false
                    }
                }
            }
        };
        release_leaked_tags(&mut self.helper, &**mission);
        ran
    }

    /// Snapshot missions and shared stores.
    pub fn save(&self) -> Result<CampaignSave> {
        let missions = self
            .missions
            .iter()
            .map(|m| m.save())
            .collect::<Result<Vec<_>>>()?;
        Ok(CampaignSave {
            missions,
            objectives: self.helper.objectives().snapshot(),
            mission_times: self.helper.mission_times().clone(),
            timeouts: self.helper.timeouts().clone(),
            tags: self.helper.tags().clone(),
        })
    }

    /// Restore a snapshot and resume whatever was outstanding at save time.
    ///
    /// A mission whose record is missing or unreadable starts over; the
    /// others load normally. Queued objective reveals are replayed by
    /// re-sending their messages, and deferred actions run immediately.
    /// Returns the number of missions restored from their records.
    pub fn load(&mut self, host: &mut Host<'_>, save: &CampaignSave) -> usize {
        self.helper.restore(
            &save.objectives,
            save.mission_times.clone(),
            save.timeouts.clone(),
            save.tags.clone(),
        );

        let mut restored = 0;
        for mission in self.missions.iter_mut() {
            match save.mission(mission.id()) {
                Some(record) => match mission.load(record) {
                    Ok(()) => restored += 1,
                    Err(err) => {
                        warn!(mission = %mission.id(), error = %err, "mission_load_failed");
                        self.helper
                            .diagnostics()
                            .record(DiagnosticKind::BadRecord, err.to_string(), Some(mission.id()));
                        mission.reset();
                    }
                },
                None => {
                    debug!(mission = %mission.id(), "mission_record_missing");
                    mission.reset();
                }
            }
        }

        for mission in self.missions.iter_mut() {
            let mut ctx = MissionCtx::from_host(&mut self.helper, host, mission.base());
            mission.base_mut().replay_pending(&mut ctx);
            for action in mission.base_mut().take_all_deferred() {
                debug!(mission = %ctx.mission(), "deferred_action_resumed");
                mission.on_resume(&mut ctx, action);
            }
        }
        info!(missions = restored, "campaign_loaded");
        restored
    }

    /// Back to a new game.
    pub fn reset(&mut self) {
        self.helper.reset();
        for mission in self.missions.iter_mut() {
            mission.reset();
        }
    }
}

/// A finished mission must not keep tags alive; report and drop any it left.
fn release_leaked_tags(helper: &mut ScriptingHelper, mission: &dyn Mission) {
    if !mission.is_done() {
        return;
    }
    let leaked: Vec<String> = helper.tags().owned_by(mission.id()).map(String::from).collect();
    for tag in &leaked {
        helper
            .diagnostics()
            .record(DiagnosticKind::LeakedTag, tag.as_str(), Some(mission.id()));
        helper.tags_mut().release(tag);
    }
}
