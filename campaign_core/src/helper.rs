//! Scripting Helper - the shared state missions reach through their context.
//!
//! Owns the objective, timer and tag stores together with the campaign data.
//! Every lookup of an id the data does not define records a diagnostic and
//! yields nothing instead of failing.

use galaxy_rules::Rect;

use crate::config::ScriptConfig;
use crate::data::{CampaignData, MessageDef};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::objectives::{Objective, ObjectiveState, ObjectiveStore};
use crate::tags::TagRegistry;
use crate::timers::{MissionTimes, Timeouts};

/// Suffix of the timeout that hides a concluded objective.
pub const HIDE_SUFFIX: &str = ".hide";

/// Id of the timeout that hides `objective` once it concluded.
pub fn hide_timeout_id(objective: &str) -> String {
    format!("{objective}{HIDE_SUFFIX}")
}

pub struct ScriptingHelper {
    data: CampaignData,
    config: ScriptConfig,
    objectives: ObjectiveStore,
    mission_times: MissionTimes,
    timeouts: Timeouts,
    tags: TagRegistry,
    diagnostics: Diagnostics,
    /// Mission currently being dispatched, for diagnostics.
    scope: Option<String>,
}

impl ScriptingHelper {
    pub fn new(data: CampaignData, config: ScriptConfig) -> Self {
        Self {
            objectives: ObjectiveStore::from_defs(&data.objectives),
            data,
            config,
            mission_times: MissionTimes::new(),
            timeouts: Timeouts::new(),
            tags: TagRegistry::new(),
            diagnostics: Diagnostics::new(),
            scope: None,
        }
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn data(&self) -> &CampaignData {
        &self.data
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn enter_scope(&mut self, mission: &str) {
        self.scope = Some(mission.to_string());
    }

    pub(crate) fn leave_scope(&mut self) {
        self.scope = None;
    }

    /// Record a defect attributed to the mission being dispatched.
    pub fn report(&self, kind: DiagnosticKind, subject: &str) {
        self.diagnostics.record(kind, subject, self.scope.as_deref());
    }

    // ---------------------------------------------------------------------
    // Objectives
    // ---------------------------------------------------------------------

    pub fn objectives(&self) -> &ObjectiveStore {
        &self.objectives
    }

    pub fn objective(&self, id: &str) -> Option<&Objective> {
        let objective = self.objectives.get(id);
        if objective.is_none() {
            self.report(DiagnosticKind::MissingObjective, id);
        }
        objective
    }

    pub fn objective_state(&self, id: &str) -> Option<ObjectiveState> {
        self.objective(id).map(|o| o.state)
    }

    /// Whether an objective reached success or failure.
    pub fn is_completed(&self, id: &str) -> bool {
        self.objective(id).map_or(false, Objective::is_completed)
    }

    /// Whether an objective ended in success.
    pub fn is_successful(&self, id: &str) -> bool {
        self.objective_state(id) == Some(ObjectiveState::Success)
    }

    /// Whether an objective is shown and in progress.
    pub fn is_active(&self, id: &str) -> bool {
        self.objective(id).map_or(false, Objective::is_active)
    }

    /// Reveal an objective; returns whether it was hidden before.
    pub fn show_objective(&mut self, id: &str) -> bool {
        match self.objectives.show(id) {
            Some(was_hidden) => was_hidden,
            None => {
                self.report(DiagnosticKind::MissingObjective, id);
                false
            }
        }
    }

    /// Hide an objective; returns whether it was visible before.
    pub fn hide_objective(&mut self, id: &str) -> bool {
        match self.objectives.hide(id) {
            Some(was_visible) => was_visible,
            None => {
                self.report(DiagnosticKind::MissingObjective, id);
                false
            }
        }
    }

    /// Change an objective's state; returns whether the value actually changed.
    pub fn set_objective_state(&mut self, id: &str, state: ObjectiveState) -> bool {
        match self.objectives.set_state(id, state) {
            Some(changed) => changed,
            None => {
                self.report(DiagnosticKind::MissingObjective, id);
                false
            }
        }
    }

    /// Conclude an objective and schedule its banner to hide.
    ///
    /// The hide timeout is only scheduled when the state changed, so repeated
    /// calls never restart it.
    pub fn conclude_objective(&mut self, id: &str, state: ObjectiveState) -> bool {
        let changed = self.set_objective_state(id, state);
        if changed && state.is_terminal() {
            let delay = self.config.objective_hide_delay_ms;
            self.timeouts.set(hide_timeout_id(id), delay);
        }
        changed
    }

    /// Hide a concluded objective once its hide timeout fired.
    pub fn hide_when_due(&mut self, id: &str) -> bool {
        if self.timeouts.check(&hide_timeout_id(id)) {
            self.hide_objective(id);
            true
        } else {
            false
        }
    }

    /// Reset matching objectives to their defined initial state.
    pub fn clear_objectives<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.objectives
            .reset_where(&self.data.objectives, predicate)
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    pub fn mission_times(&self) -> &MissionTimes {
        &self.mission_times
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Schedule `id` at absolute game hour `at`, replacing any earlier entry.
    pub fn set_mission_time(&mut self, id: &str, at: u64) {
        self.mission_times.set(id, at);
    }

    pub fn check_mission_time(&mut self, id: &str, now: u64) -> bool {
        self.mission_times.check(id, now)
    }

    pub fn set_timeout(&mut self, id: &str, millis: u64) {
        self.timeouts.set(id, millis);
    }

    pub fn check_timeout(&mut self, id: &str) -> bool {
        self.timeouts.check(id)
    }

    pub fn advance_timeouts(&mut self, elapsed_ms: u64) {
        self.timeouts.advance(elapsed_ms);
    }

    pub fn clear_mission_times<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.mission_times.clear_where(predicate)
    }

    pub fn clear_timeouts<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.timeouts.clear_where(predicate)
    }

    // ---------------------------------------------------------------------
    // Tags, messages, view limits
    // ---------------------------------------------------------------------

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }

    pub fn message(&self, id: &str) -> Option<&MessageDef> {
        let message = self.data.message(id);
        if message.is_none() {
            self.report(DiagnosticKind::MissingMessage, id);
        }
        message
    }

    pub fn view_limit(&self, level: u32) -> Option<Rect> {
        self.data.view_limit(level)
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Overwrite all runtime stores with saved contents.
    pub(crate) fn restore(
        &mut self,
        objectives: &[Objective],
        mission_times: MissionTimes,
        timeouts: Timeouts,
        tags: TagRegistry,
    ) {
        self.objectives = ObjectiveStore::from_defs(&self.data.objectives);
        self.objectives.restore(objectives);
        self.mission_times = mission_times;
        self.timeouts = timeouts;
        self.tags = tags;
    }

    /// Back to the state of a new game.
    pub fn reset(&mut self) {
        self.objectives = ObjectiveStore::from_defs(&self.data.objectives);
        self.mission_times.clear();
        self.timeouts.clear();
        self.tags.clear();
        self.scope = None;
    }
}
