//! The mission contract.
//!
//! A mission is a small state machine reacting to world events. The
//! [`Mission`] trait lists every hook the dispatcher may call, each a no-op by
//! default, so a concrete mission implements only what it reacts to.
//! [`MissionBase`] carries the bookkeeping every mission shares, and
//! [`MissionCtx`] is the per-call seam to shared state and the host.

mod joint_battle;
mod persist;

pub use joint_battle::*;
pub use persist::*;

use galaxy_rules::{Battle, EntityId, EntityKind, FleetTask, PlanetId, PlayerId, Position};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::diagnostics::DiagnosticKind;
use crate::environment::{GameSpeed, Host, Localization, Presentation, SoundChannel, World};
use crate::error::Result;
use crate::helper::ScriptingHelper;
use crate::objectives::ObjectiveState;

/// How a continuation resumes its mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resume {
    /// Reveal the objectives queued behind an acknowledged message.
    Reveal { message: String },
    /// Run a mission-defined action, stored in its serialized form.
    Action(Value),
}

/// Presentation state put back once a playback completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfterPlayback {
    /// Return to the speed the game ran at before a cut-scene.
    Speed(GameSpeed),
    /// Let the simulation run again.
    Unpause,
}

impl AfterPlayback {
    pub fn apply(self, presentation: &mut dyn Presentation) {
        match self {
            AfterPlayback::Speed(speed) => presentation.set_speed(speed),
            AfterPlayback::Unpause => presentation.resume(),
        }
    }
}

/// A deferred step handed to the presentation layer, returned to
/// [`crate::Campaign::resume`] once playback completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    pub mission: String,
    pub resume: Resume,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<AfterPlayback>,
}

/// Objectives waiting for a message to be acknowledged.
///
/// Persists as `[message, objective, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct PendingReveal {
    pub message: String,
    pub objectives: Vec<String>,
}

impl From<PendingReveal> for Vec<String> {
    fn from(value: PendingReveal) -> Self {
        let mut out = Vec::with_capacity(value.objectives.len() + 1);
        out.push(value.message);
        out.extend(value.objectives);
        out
    }
}

impl TryFrom<Vec<String>> for PendingReveal {
    type Error = String;

    fn try_from(mut value: Vec<String>) -> std::result::Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("pending objective record without a message".to_string());
        }
        let message = value.remove(0);
        Ok(Self {
            message,
            objectives: value,
        })
    }
}

/// State every mission carries besides its own stage.
#[derive(Debug, Clone)]
pub struct MissionBase {
    id: String,
    player: PlayerId,
    pending_objectives: Vec<PendingReveal>,
    /// Serialized actions handed out as continuations and not yet completed.
    deferred: Vec<Value>,
}

impl MissionBase {
    pub fn new(id: impl Into<String>, player: PlayerId) -> Self {
        Self {
            id: id.into(),
            player,
            pending_objectives: Vec::new(),
            deferred: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The player this mission is scripted for.
    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn pending_objectives(&self) -> &[PendingReveal] {
        &self.pending_objectives
    }

    pub fn deferred(&self) -> &[Value] {
        &self.deferred
    }

    pub fn reset(&mut self) {
        self.pending_objectives.clear();
        self.deferred.clear();
    }

    pub(crate) fn restore(&mut self, pending: Vec<PendingReveal>, deferred: Vec<Value>) {
        self.pending_objectives = pending;
        self.deferred = deferred;
    }

    /// Send a message; once the player acknowledges it, reveal `objectives`.
    ///
    /// A message missing from the campaign data is reported and the
    /// objectives are revealed right away.
    pub fn incoming_message(&mut self, ctx: &mut MissionCtx<'_>, message: &str, objectives: &[&str]) {
        self.send_message(ctx, message, objectives, false);
    }

    /// Like [`Self::incoming_message`], but the game stays paused until the
    /// message is acknowledged.
    pub fn urgent_message(&mut self, ctx: &mut MissionCtx<'_>, message: &str, objectives: &[&str]) {
        self.send_message(ctx, message, objectives, true);
    }

    fn send_message(&mut self, ctx: &mut MissionCtx<'_>, message: &str, objectives: &[&str], pause: bool) {
        ctx.world.receive_message(&self.player, message);
        if ctx.helper.message(message).is_none() {
            for objective in objectives {
                ctx.helper.show_objective(objective);
            }
            return;
        }
        if !objectives.is_empty() {
            self.pending_objectives.push(PendingReveal {
                message: message.to_string(),
                objectives: objectives.iter().map(|o| o.to_string()).collect(),
            });
        }
        let then = if pause {
            ctx.presentation.pause();
            let mut then = self.reveal_continuation(message);
            then.after = Some(AfterPlayback::Unpause);
            Some(then)
        } else if objectives.is_empty() {
            None
        } else {
            Some(self.reveal_continuation(message))
        };
        ctx.presentation.force_message(message, then);
    }

    fn reveal_continuation(&self, message: &str) -> Continuation {
        Continuation {
            mission: self.id.clone(),
            resume: Resume::Reveal {
                message: message.to_string(),
            },
            after: None,
        }
    }

    /// Record an action as outstanding and wrap it in a continuation.
    pub fn defer<A: Serialize + Debug>(
        &mut self,
        ctx: &MissionCtx<'_>,
        action: &A,
    ) -> Option<Continuation> {
        match serde_json::to_value(action) {
            Ok(value) => {
                self.deferred.push(value.clone());
                Some(Continuation {
                    mission: self.id.clone(),
                    resume: Resume::Action(value),
                    after: None,
                })
            }
            Err(_) => {
                ctx.helper
                    .report(DiagnosticKind::BadContinuation, &format!("{action:?}"));
                None
            }
        }
    }

    /// Play a cut-scene at the configured speed, then run `action`. The
    /// previous speed comes back when the video ends.
    pub fn play_video<A: Serialize + Debug>(&mut self, ctx: &mut MissionCtx<'_>, video: &str, action: &A) {
        let Some(mut then) = self.defer(ctx, action) else {
            ctx.presentation.play_video(video, None);
            return;
        };
        let previous = ctx.presentation.speed();
        let speed = ctx.helper.config().cutscene_speed;
        if speed != previous {
            ctx.presentation.set_speed(speed);
            then.after = Some(AfterPlayback::Speed(previous));
        }
        ctx.presentation.play_video(video, Some(then));
    }

    /// Open a story beat: play the message's video if it has one, otherwise
    /// pop the message itself, then run `action`.
    pub fn cutscene<A: Serialize + Debug>(&mut self, ctx: &mut MissionCtx<'_>, message: &str, action: &A) {
        let video = ctx.helper.message(message).and_then(|m| m.video.clone());
        match video {
            Some(video) => self.play_video(ctx, &video, action),
            None => self.force_message(ctx, message, action),
        }
    }

    /// Pop a message open, then run `action` once it is acknowledged.
    pub fn force_message<A: Serialize + Debug>(&mut self, ctx: &mut MissionCtx<'_>, message: &str, action: &A) {
        ctx.world.receive_message(&self.player, message);
        let then = self.defer(ctx, action);
        ctx.presentation.force_message(message, then);
    }

    /// Reveal the objectives queued behind `message`. Returns `false` if
    /// nothing was queued for it.
    pub(crate) fn reveal(&mut self, ctx: &mut MissionCtx<'_>, message: &str) -> bool {
        let Some(index) = self
            .pending_objectives
            .iter()
            .position(|p| p.message == message)
        else {
            return false;
        };
        let record = self.pending_objectives.remove(index);
        for objective in &record.objectives {
            ctx.helper.show_objective(objective);
        }
        debug!(mission = %self.id, message, "objectives_revealed");
        true
    }

    /// Re-force every message that still has objectives queued, oldest first.
    pub(crate) fn replay_pending(&mut self, ctx: &mut MissionCtx<'_>) {
        let messages: Vec<String> = self
            .pending_objectives
            .iter()
            .map(|p| p.message.clone())
            .collect();
        for message in messages {
            let then = self.reveal_continuation(&message);
            ctx.presentation.force_message(&message, Some(then));
        }
    }

    /// Remove one outstanding action; `false` if it was not outstanding.
    pub(crate) fn take_deferred(&mut self, action: &Value) -> bool {
        match self.deferred.iter().position(|v| v == action) {
            Some(index) => {
                self.deferred.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_all_deferred(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.deferred)
    }
}

/// Everything a mission handler may touch besides its own state.
pub struct MissionCtx<'a> {
    pub helper: &'a mut ScriptingHelper,
    pub world: &'a mut dyn World,
    pub presentation: &'a mut dyn Presentation,
    pub text: &'a dyn Localization,
    mission: String,
    player: PlayerId,
}

impl<'a> MissionCtx<'a> {
    pub fn new(
        helper: &'a mut ScriptingHelper,
        world: &'a mut dyn World,
        presentation: &'a mut dyn Presentation,
        text: &'a dyn Localization,
        base: &MissionBase,
    ) -> Self {
        helper.enter_scope(base.id());
        Self {
            helper,
            world,
            presentation,
            text,
            mission: base.id().to_string(),
            player: base.player().clone(),
        }
    }

    pub fn from_host(helper: &'a mut ScriptingHelper, host: &'a mut Host<'_>, base: &MissionBase) -> Self {
        Self::new(
            helper,
            &mut *host.world,
            &mut *host.presentation,
            host.text,
            base,
        )
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    /// Elapsed in-game hours.
    pub fn now(&self) -> u64 {
        self.world.elapsed_hours()
    }

    pub fn level(&self) -> u32 {
        self.world.level()
    }

    /// Whether the scripted player exists in this game.
    pub fn has_player(&self) -> bool {
        self.world.player(&self.player).is_some()
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// Schedule `id` to fire `hours` from now.
    pub fn add_mission(&mut self, id: &str, hours: u64) {
        let at = self.now() + hours;
        debug!(mission = %self.mission, timer = id, at, "mission_time_set");
        self.helper.set_mission_time(id, at);
    }

    /// Test-and-clear a mission-time entry.
    pub fn check_mission(&mut self, id: &str) -> bool {
        let now = self.now();
        self.helper.check_mission_time(id, now)
    }

    pub fn add_timeout(&mut self, id: &str, millis: u64) {
        self.helper.set_timeout(id, millis);
    }

    /// Test-and-clear a timeout.
    pub fn check_timeout(&mut self, id: &str) -> bool {
        self.helper.check_timeout(id)
    }

    // ---------------------------------------------------------------------
    // Objectives
    // ---------------------------------------------------------------------

    pub fn objective_state(&self, id: &str) -> Option<ObjectiveState> {
        self.helper.objective_state(id)
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.helper.is_completed(id)
    }

    pub fn is_successful(&self, id: &str) -> bool {
        self.helper.is_successful(id)
    }

    pub fn show_objective(&mut self, id: &str) -> bool {
        self.helper.show_objective(id)
    }

    pub fn set_objective_state(&mut self, id: &str, state: ObjectiveState) -> bool {
        self.helper.set_objective_state(id, state)
    }

    /// Set a terminal state and schedule the banner to hide.
    pub fn conclude_objective(&mut self, id: &str, state: ObjectiveState) -> bool {
        let changed = self.helper.conclude_objective(id, state);
        if changed {
            info!(mission = %self.mission, objective = id, state = ?state, "objective_concluded");
        }
        changed
    }

    pub fn hide_when_due(&mut self, id: &str) -> bool {
        self.helper.hide_when_due(id)
    }

    // ---------------------------------------------------------------------
    // Entities and tags
    // ---------------------------------------------------------------------

    /// Create an empty fleet named by a text key.
    pub fn create_fleet(&mut self, owner: &PlayerId, name_key: &str, position: Position) -> EntityId {
        let name = self.text(name_key);
        let name = if name.is_empty() { name_key.to_string() } else { name };
        self.world.create_fleet(owner, &name, position)
    }

    /// Put ships into a fleet regardless of deployment limits.
    pub fn add_inventory(&mut self, fleet: EntityId, type_id: &str, count: u32) -> Option<EntityId> {
        self.world.add_inventory(fleet, type_id, count)
    }

    pub fn tag_fleet(&mut self, fleet: EntityId, tag: &str) {
        let mission = self.mission.clone();
        self.helper
            .tags_mut()
            .tag(tag, fleet, EntityKind::Fleet, mission);
    }

    pub fn tag_item(&mut self, item: EntityId, tag: &str) {
        let mission = self.mission.clone();
        self.helper
            .tags_mut()
            .tag(tag, item, EntityKind::InventoryItem, mission);
    }

    /// The live fleet of `owner` carrying `tag`.
    pub fn find_tagged_fleet(&self, tag: &str, owner: &PlayerId) -> Option<EntityId> {
        self.helper.tags().find_fleet(tag, owner, &*self.world)
    }

    /// Give the fleet behind a tag a new order.
    pub fn order_tagged_fleet(&mut self, tag: &str, owner: &PlayerId, task: FleetTask) -> bool {
        match self.find_tagged_fleet(tag, owner) {
            Some(fleet) => self.world.order_fleet(fleet, task),
            None => false,
        }
    }

    /// Remove the fleet behind a tag from the world and release the tag.
    pub fn remove_tagged_fleet(&mut self, tag: &str) -> bool {
        let Some(entry) = self.helper.tags_mut().release(tag) else {
            return false;
        };
        let fleet = match entry.kind {
            EntityKind::Fleet => Some(entry.entity),
            EntityKind::InventoryItem => self.world.fleet_with_item(entry.entity).map(|f| f.id),
        };
        fleet.map_or(false, |id| self.world.remove_fleet(id))
    }

    pub fn release_tag(&mut self, tag: &str) -> bool {
        self.helper.tags_mut().release(tag).is_some()
    }

    /// Release every tag this mission registered.
    pub fn release_tags(&mut self) -> usize {
        let released = self.helper.tags_mut().release_owned_by(&self.mission);
        if !released.is_empty() {
            debug!(mission = %self.mission, count = released.len(), "tags_released");
        }
        released.len()
    }

    // ---------------------------------------------------------------------
    // Narrative
    // ---------------------------------------------------------------------

    /// Localized text, or an empty string with a diagnostic.
    pub fn text(&self, key: &str) -> String {
        match self.text.text(key) {
            Some(text) => text,
            None => {
                self.helper.report(DiagnosticKind::MissingText, key);
                String::new()
            }
        }
    }

    pub fn format(&self, key: &str, params: &[&str]) -> String {
        match self.text.format(key, params) {
            Some(text) => text,
            None => {
                self.helper.report(DiagnosticKind::MissingText, key);
                String::new()
            }
        }
    }

    /// Play a sound without waiting for it.
    pub fn sound(&mut self, channel: SoundChannel, sound: &str) {
        self.presentation.play_sound(channel, sound, None);
    }

    /// The player lost the campaign.
    pub fn gameover(&mut self) {
        info!(mission = %self.mission, "game_over");
        self.presentation.game_over();
    }

    /// The player won the campaign.
    pub fn win(&mut self) {
        info!(mission = %self.mission, "campaign_won");
        self.presentation.win();
    }

    /// Decode a mission action from a continuation.
    pub fn decode<A: DeserializeOwned>(&self, action: Value) -> Option<A> {
        match serde_json::from_value(action) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                self.helper
                    .report(DiagnosticKind::BadContinuation, &err.to_string());
                None
            }
        }
    }
}

impl Drop for MissionCtx<'_> {
    fn drop(&mut self) {
        self.helper.leave_scope();
    }
}

/// Move a stage forward, logging the transition.
pub fn set_stage<S: Debug + PartialEq + Copy>(mission: &str, stage: &mut S, next: S) {
    if *stage != next {
        info!(mission, from = ?*stage, to = ?next, "mission_stage");
        *stage = next;
    }
}

/// A campaign mission.
///
/// Every event hook is a no-op unless overridden. The same event reaches every
/// applicable mission, so a hook must check that the event concerns its own
/// tagged entities before reacting.
#[allow(unused_variables)]
pub trait Mission {
    fn base(&self) -> &MissionBase;
    fn base_mut(&mut self) -> &mut MissionBase;

    fn id(&self) -> &str {
        self.base().id()
    }

    /// Whether the mission currently participates in dispatch.
    fn applicable(&self, ctx: &MissionCtx<'_>) -> bool;

    /// Name of the current stage, as persisted.
    fn stage_name(&self) -> String;

    /// Reached the terminal stage.
    fn is_done(&self) -> bool {
        false
    }

    /// Rewind to the initial stage for a new game.
    fn reset(&mut self);

    fn save(&self) -> Result<MissionRecord>;
    fn load(&mut self, record: &MissionRecord) -> Result<()>;

    /// Once per simulation tick.
    fn on_time(&mut self, ctx: &mut MissionCtx<'_>) {}

    /// A continuation handed out by this mission completed.
    fn on_resume(&mut self, ctx: &mut MissionCtx<'_>, action: Value) {}

    fn on_fleet_at(&mut self, ctx: &mut MissionCtx<'_>, fleet: EntityId, position: Position) {}
    fn on_fleet_at_planet(&mut self, ctx: &mut MissionCtx<'_>, fleet: EntityId, planet: &PlanetId) {}
    fn on_fleet_at_fleet(&mut self, ctx: &mut MissionCtx<'_>, fleet: EntityId, other: EntityId) {}

    fn on_spacewar_start(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {}
    fn on_spacewar_finish(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {}
    fn on_autobattle_start(&mut self, ctx: &mut MissionCtx<'_>, battle: &mut Battle) {}
    fn on_autobattle_finish(&mut self, ctx: &mut MissionCtx<'_>, battle: &Battle) {}

    fn on_conquered(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId, previous_owner: Option<&PlayerId>) {}
    fn on_lost(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {}
    fn on_discovered(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {}
    fn on_message_seen(&mut self, ctx: &mut MissionCtx<'_>, message: &str) {}
    fn on_talk_completed(&mut self, ctx: &mut MissionCtx<'_>, person: &str) {}
    fn on_planet_infected(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {}
    fn on_planet_cured(&mut self, ctx: &mut MissionCtx<'_>, planet: &PlanetId) {}
    fn on_level_changed(&mut self, ctx: &mut MissionCtx<'_>, level: u32) {}
    fn on_loaded(&mut self, ctx: &mut MissionCtx<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptConfig;
    use crate::data::CampaignData;
    use crate::environment::ScriptedPresentation;
    use galaxy_rules::{Player, WorldState};

    struct Fixture {
        helper: ScriptingHelper,
        world: WorldState,
        presentation: ScriptedPresentation,
        text: crate::data::TextCatalog,
        base: MissionBase,
    }

    fn fixture() -> Fixture {
        let data = CampaignData::builtin().unwrap();
        let text = data.text_catalog();
        let mut world = WorldState::new();
        world.add_player(Player::new("Empire", "human", false));
        Fixture {
            helper: ScriptingHelper::new(data, ScriptConfig::default()),
            world,
            presentation: ScriptedPresentation::new(),
            text,
            base: MissionBase::new("Test", PlayerId::from("Empire")),
        }
    }

    #[test]
    fn test_pending_reveal_shape() {
        let record = PendingReveal {
            message: "Msg".to_string(),
            objectives: vec!["obj1".to_string(), "obj2".to_string()],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"["Msg","obj1","obj2"]"#);
        assert_eq!(serde_json::from_str::<PendingReveal>(&json).unwrap(), record);
        assert!(serde_json::from_str::<PendingReveal>("[]").is_err());
    }

    #[test]
    fn test_incoming_message_queues_reveal() {
        let mut f = fixture();
        let mut base = f.base.clone();
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            base.incoming_message(&mut ctx, "Msg.Patrol", &["Patrol.Reach", "Escort.Protect"]);
        }
        assert_eq!(base.pending_objectives().len(), 1);
        assert_eq!(
            base.pending_objectives()[0].objectives,
            vec!["Patrol.Reach".to_string(), "Escort.Protect".to_string()]
        );
        assert!(!f.helper.objective("Patrol.Reach").unwrap().visible);
        assert_eq!(
            f.world.get_player(&PlayerId::from("Empire")).unwrap().inbox,
            vec!["Msg.Patrol".to_string()]
        );

        let continuation = f.presentation.complete_next().unwrap();
        assert_eq!(
            continuation.resume,
            Resume::Reveal {
                message: "Msg.Patrol".to_string()
            }
        );
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            assert!(base.reveal(&mut ctx, "Msg.Patrol"));
            assert!(!base.reveal(&mut ctx, "Msg.Patrol"));
        }
        assert!(base.pending_objectives().is_empty());
        assert!(f.helper.objective("Patrol.Reach").unwrap().visible);
        assert!(f.helper.objective("Escort.Protect").unwrap().visible);
    }

    #[test]
    fn test_incoming_unknown_message_reveals_immediately() {
        let mut f = fixture();
        let mut base = f.base.clone();
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            base.incoming_message(&mut ctx, "Msg.Unknown", &["Patrol.Reach"]);
        }
        assert!(base.pending_objectives().is_empty());
        assert!(f.helper.objective("Patrol.Reach").unwrap().visible);
        assert_eq!(f.helper.diagnostics().count(DiagnosticKind::MissingMessage), 1);
        assert_eq!(f.presentation.pending(), 0);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    enum Step {
        AfterIntro,
    }

    #[test]
    fn test_deferred_action_round_trip() {
        let mut f = fixture();
        let mut base = f.base.clone();
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            base.play_video(&mut ctx, "intro", &Step::AfterIntro);
        }
        assert_eq!(base.deferred().len(), 1);
        assert_eq!(f.presentation.videos(), vec!["intro"]);

        let continuation = f.presentation.complete_next().unwrap();
        assert_eq!(continuation.after, None);
        let Resume::Action(value) = continuation.resume else {
            panic!("expected an action continuation");
        };
        assert!(base.take_deferred(&value));
        assert!(!base.take_deferred(&value));

        let ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
        assert_eq!(ctx.decode::<Step>(value), Some(Step::AfterIntro));
        assert_eq!(ctx.decode::<Step>(Value::from(3)), None);
    }

    #[test]
    fn test_video_remembers_previous_speed() {
        let mut f = fixture();
        let mut base = f.base.clone();
        f.presentation.set_speed(GameSpeed::Fast);
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            base.play_video(&mut ctx, "intro", &Step::AfterIntro);
        }
        assert_eq!(f.presentation.speed(), GameSpeed::Normal);

        let continuation = f.presentation.complete_next().unwrap();
        assert_eq!(continuation.after, Some(AfterPlayback::Speed(GameSpeed::Fast)));
        continuation.after.unwrap().apply(&mut f.presentation);
        assert_eq!(f.presentation.speed(), GameSpeed::Fast);
    }

    #[test]
    fn test_urgent_message_pauses() {
        let mut f = fixture();
        let mut base = f.base.clone();
        {
            let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);
            base.urgent_message(&mut ctx, "Msg.EscortThanks", &[]);
        }
        assert!(f.presentation.is_paused());
        assert!(base.pending_objectives().is_empty());

        let continuation = f.presentation.complete_next().unwrap();
        assert_eq!(continuation.after, Some(AfterPlayback::Unpause));
        continuation.after.unwrap().apply(&mut f.presentation);
        assert!(!f.presentation.is_paused());
    }

    #[test]
    fn test_ctx_scheduling_and_text() {
        let mut f = fixture();
        f.world.advance_hours(10);
        let base = f.base.clone();
        let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);

        ctx.add_mission("Test.Wait", 5);
        assert!(!ctx.check_mission("Test.Wait"));
        ctx.world.set_level(1);
        assert_eq!(ctx.text("fleet.trader"), "Merchant convoy");
        assert_eq!(ctx.format("objective.epidemic.cure", &["Naxos"]), "Cure the plague on Naxos");
        assert_eq!(ctx.text("nope"), "");
        assert_eq!(ctx.helper.mission_times().get("Test.Wait"), Some(15));
    }

    #[test]
    fn test_ctx_tags() {
        let mut f = fixture();
        let base = f.base.clone();
        let owner = PlayerId::from("Empire");
        let mut ctx = MissionCtx::new(&mut f.helper, &mut f.world, &mut f.presentation, &f.text, &base);

        let fleet = ctx.create_fleet(&owner, "fleet.loyalists", Position::default());
        let item = ctx.add_inventory(fleet, "Fighter1", 4).unwrap();
        ctx.tag_item(item, "Test.Item");
        ctx.tag_fleet(fleet, "Test.Fleet");

        assert_eq!(ctx.world.fleet(fleet).unwrap().name, "Loyal garrison");
        assert_eq!(ctx.find_tagged_fleet("Test.Item", &owner), Some(fleet));
        assert!(ctx.order_tagged_fleet("Test.Fleet", &owner, FleetTask::Follow(fleet)));

        assert!(ctx.remove_tagged_fleet("Test.Fleet"));
        assert!(ctx.world.fleet(fleet).is_none());
        assert_eq!(ctx.release_tags(), 1);
        assert!(ctx.helper.tags().is_empty());
    }
}
