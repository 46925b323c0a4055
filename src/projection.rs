//! History replay: project derived state from the log.
//!
//! Derived state is never persisted. The log is the single source of
//! truth and [`project`] is a pure, idempotent replay over an injected
//! snapshot of it; there is no cached "current state" record that could
//! drift from the log.

use serde::Serialize;
use std::collections::HashSet;

use crate::history::{HistoryEntry, STATUS_COMPLETE, STATUS_REJECT};
use crate::mode::{Mode, ModeDecision};
use crate::phase::{PHASE_DESIGN_FREEZE, PhaseDefinition, find_phase};

/// Current phase, completed set, and frozen flag, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    pub current_phase: Option<String>,
    /// Distinct phase ids with a `complete` entry anywhere in the log,
    /// first-seen order.
    pub completed: Vec<String>,
    /// One-way flag: the design-freeze phase was completed at some point.
    pub frozen: bool,
}

/// Replay the history against the active catalog.
///
/// Only the last entry determines the current phase; the whole log feeds
/// the completed set and the frozen flag. A `complete` entry for a phase
/// absent from the catalog (the catalog may have changed since the entry
/// was written) re-uses that phase id rather than failing.
pub fn project(
    history: &[HistoryEntry],
    catalog: &[PhaseDefinition],
    decision: &ModeDecision,
) -> DerivedState {
    let Some(latest) = history.last() else {
        let current_phase = match decision.mode {
            Mode::Builtin => decision.start_phase.map(str::to_string),
            _ => catalog.first().map(|p| p.id.clone()),
        };
        return DerivedState {
            current_phase,
            completed: Vec::new(),
            frozen: false,
        };
    };

    let current_phase = match latest.status.as_str() {
        // Advance to the first successor; a terminal phase stays put.
        STATUS_COMPLETE => find_phase(catalog, &latest.phase)
            .and_then(PhaseDefinition::first_successor)
            .unwrap_or(latest.phase.as_str())
            .to_string(),
        // Re-open the target, or the rejected phase itself.
        STATUS_REJECT => latest
            .target
            .clone()
            .unwrap_or_else(|| latest.phase.clone()),
        _ => latest.phase.clone(),
    };

    let mut seen = HashSet::new();
    let completed: Vec<String> = history
        .iter()
        .filter(|e| e.status == STATUS_COMPLETE)
        .filter(|e| seen.insert(e.phase.clone()))
        .map(|e| e.phase.clone())
        .collect();

    let frozen = history
        .iter()
        .any(|e| e.phase == PHASE_DESIGN_FREEZE && e.status == STATUS_COMPLETE);

    DerivedState {
        current_phase: Some(current_phase),
        completed,
        frozen,
    }
}
