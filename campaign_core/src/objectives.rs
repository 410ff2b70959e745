//! Player-visible objectives.

use serde::{Deserialize, Serialize};

use crate::data::ObjectiveDef;

/// Progress of an objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveState {
    #[default]
    Active,
    Success,
    Failure,
}

impl ObjectiveState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ObjectiveState::Active)
    }
}

/// Runtime state of one objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub visible: bool,
    pub state: ObjectiveState,
}

impl Objective {
    pub fn new(id: impl Into<String>, visible: bool) -> Self {
        Self {
            id: id.into(),
            visible,
            state: ObjectiveState::Active,
        }
    }

    /// Shown and still in progress.
    pub fn is_active(&self) -> bool {
        self.visible && self.state == ObjectiveState::Active
    }

    /// Reached success or failure.
    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }
}

/// All objectives of the campaign, in definition order.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveStore {
    entries: Vec<Objective>,
}

impl ObjectiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh objectives from their definitions.
    pub fn from_defs(defs: &[ObjectiveDef]) -> Self {
        Self {
            entries: defs
                .iter()
                .map(|d| Objective::new(d.id.clone(), d.visible))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Objective> {
        self.entries.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Objective> {
        self.entries.iter_mut().find(|o| o.id == id)
    }

    /// Change an objective's state.
    ///
    /// `None` if the objective is unknown, otherwise whether the state changed.
    pub fn set_state(&mut self, id: &str, state: ObjectiveState) -> Option<bool> {
        let objective = self.get_mut(id)?;
        if objective.state == state {
            return Some(false);
        }
        objective.state = state;
        Some(true)
    }

    /// Make an objective visible; `Some(true)` if it was hidden before.
    pub fn show(&mut self, id: &str) -> Option<bool> {
        let objective = self.get_mut(id)?;
        let was_hidden = !objective.visible;
        objective.visible = true;
        Some(was_hidden)
    }

    /// Hide an objective; `Some(true)` if it was visible before.
    pub fn hide(&mut self, id: &str) -> Option<bool> {
        let objective = self.get_mut(id)?;
        let was_visible = objective.visible;
        objective.visible = false;
        Some(was_visible)
    }

    /// Return matching objectives to their defined initial state.
    pub fn reset_where<F>(&mut self, defs: &[ObjectiveDef], predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut count = 0;
        for objective in self.entries.iter_mut().filter(|o| predicate(&o.id)) {
            let visible = defs
                .iter()
                .find(|d| d.id == objective.id)
                .map(|d| d.visible)
                .unwrap_or(false);
            objective.visible = visible;
            objective.state = ObjectiveState::Active;
            count += 1;
        }
        count
    }

    /// Objectives currently on screen.
    pub fn visible(&self) -> impl Iterator<Item = &Objective> {
        self.entries.iter().filter(|o| o.visible)
    }

    pub fn snapshot(&self) -> Vec<Objective> {
        self.entries.clone()
    }

    /// Overlay saved objective states; ids no longer defined are dropped.
    pub fn restore(&mut self, saved: &[Objective]) -> usize {
        let mut restored = 0;
        for entry in saved {
            if let Some(objective) = self.get_mut(&entry.id) {
                objective.visible = entry.visible;
                objective.state = entry.state;
                restored += 1;
            }
        }
        restored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
