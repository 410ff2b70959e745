//! Non-fatal defect reporting.
//!
//! A mission asking for an objective, message or text that the campaign data
//! does not define is an authoring mistake, not a reason to stop the session.
//! Such lookups record a [`Diagnostic`], log it, and return nothing.

use std::cell::RefCell;
use tracing::warn;

/// Category of a recorded defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingObjective,
    MissingMessage,
    MissingText,
    MissingMission,
    StaleTag,
    LeakedTag,
    BadContinuation,
    BadRecord,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingObjective => "missing_objective",
            DiagnosticKind::MissingMessage => "missing_message",
            DiagnosticKind::MissingText => "missing_text",
            DiagnosticKind::MissingMission => "missing_mission",
            DiagnosticKind::StaleTag => "stale_tag",
            DiagnosticKind::LeakedTag => "leaked_tag",
            DiagnosticKind::BadContinuation => "bad_continuation",
            DiagnosticKind::BadRecord => "bad_record",
        }
    }
}

/// One recorded defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The id that could not be resolved.
    pub subject: String,
    /// Mission that triggered the lookup, when known.
    pub mission: Option<String>,
}

/// Append-only defect log.
///
/// Recording goes through `&self` so read-only lookups can still report.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a defect.
    pub fn record(&self, kind: DiagnosticKind, subject: impl Into<String>, mission: Option<&str>) {
        let subject = subject.into();
        warn!(
            kind = kind.as_str(),
            subject = %subject,
            mission = mission.unwrap_or("-"),
            "script_diagnostic"
        );
        self.entries.borrow_mut().push(Diagnostic {
            kind,
            subject,
            mission: mission.map(str::to_string),
        });
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.borrow().iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
