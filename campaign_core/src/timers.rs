//! Scheduling primitives.
//!
//! Two independent stores:
//! - [`MissionTimes`]: absolute triggers on the game clock, in elapsed hours.
//! - [`Timeouts`]: countdowns in milliseconds of real time, decremented by the
//!   frame loop regardless of simulation speed.
//!
//! Both are keyed by id, overwrite on re-add, and fire through an atomic
//! test-and-clear `check`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Game-clock triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionTimes {
    entries: BTreeMap<String, u64>,
}

impl MissionTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `id` to fire at absolute hour `at`, replacing any previous entry.
    pub fn set(&mut self, id: impl Into<String>, at: u64) {
        self.entries.insert(id.into(), at);
    }

    /// Fire `id` if it is due at `now`. A fired entry is removed.
    pub fn check(&mut self, id: &str, now: u64) -> bool {
        match self.entries.get(id) {
            Some(&at) if now >= at => {
                self.entries.remove(id);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Hours left until `id` fires; zero when already due.
    pub fn remaining(&self, id: &str, now: u64) -> Option<u64> {
        self.get(id).map(|at| at.saturating_sub(now))
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Drop every entry whose id matches; returns how many were dropped.
    pub fn clear_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|id, _| !predicate(id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Real-time countdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeouts {
    entries: BTreeMap<String, u64>,
}

impl Timeouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown of `millis`, replacing any running one with the same id.
    pub fn set(&mut self, id: impl Into<String>, millis: u64) {
        self.entries.insert(id.into(), millis);
    }

    /// Count every entry down by `elapsed` milliseconds.
    pub fn advance(&mut self, elapsed: u64) {
        for remaining in self.entries.values_mut() {
            *remaining = remaining.saturating_sub(elapsed);
        }
    }

    /// Fire `id` if its countdown reached zero. A fired entry is removed;
    /// an absent entry never fires.
    pub fn check(&mut self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(0) => {
                self.entries.remove(id);
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, id: &str) -> Option<u64> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|id, _| !predicate(id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
