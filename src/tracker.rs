//! Request-scoped facade wiring the store, mode resolver, catalog
//! provider, and projector together.
//!
//! A tracker holds no derived state: every method re-resolves the mode
//! and re-reads the underlying documents, tolerating concurrent external
//! edits to the files between calls.

use crate::history::NamedHistoryEntry;
use crate::layout::ProjectLayout;
use crate::mode::{self, Mode, ModeDecision};
use crate::phase::{PhaseDefinition, find_phase};
use crate::projection::{self, DerivedState};
use crate::store::DocumentStore;

pub struct PhaseTracker {
    store: DocumentStore,
}

impl PhaseTracker {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            store: DocumentStore::new(layout),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn mode(&self) -> ModeDecision {
        mode::resolve(&self.store)
    }

    /// The active phase catalog for a fresh mode resolution.
    pub fn phases(&self) -> Vec<PhaseDefinition> {
        self.phases_for(&self.mode())
    }

    /// The active phase catalog for an already-resolved mode.
    pub fn phases_for(&self, decision: &ModeDecision) -> Vec<PhaseDefinition> {
        match decision.mode {
            Mode::Builtin => self.store.load_builtin_phases(),
            Mode::Framework => self
                .store
                .load_manifest()
                .map(|m| m.phases)
                .unwrap_or_default(),
            Mode::Error => Vec::new(),
        }
    }

    /// Replay the history log into the derived state.
    pub fn derived_state(&self) -> DerivedState {
        let decision = self.mode();
        let catalog = self.phases_for(&decision);
        let history = self.store.load_history();
        projection::project(&history, &catalog, &decision)
    }

    /// The history log with phase names resolved from the active catalog.
    pub fn named_history(&self) -> Vec<NamedHistoryEntry> {
        let catalog = self.phases();
        self.store
            .load_history()
            .into_iter()
            .map(|entry| {
                let phase_name = find_phase(&catalog, &entry.phase)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| entry.phase.clone());
                NamedHistoryEntry { entry, phase_name }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PHASE_FRAMEWORK_INIT;
    use std::fs;
    use tempfile::tempdir;

    fn framework_project() -> (PhaseTracker, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".phasewatch-history.yml"), "[]\n").unwrap();
        fs::write(
            dir.path().join("project-config.yml"),
            "framework:\n  id: f1\n",
        )
        .unwrap();
        let framework_dir = dir.path().join(".phasewatch/framework");
        fs::create_dir_all(&framework_dir).unwrap();
        fs::write(
            framework_dir.join("framework.yml"),
            "meta:\n  id: f1\n  name: F1\nphases:\n  - id: p1\n    name: Design\n    next: [p2]\n  - id: p2\n    name: Build\n",
        )
        .unwrap();
        (PhaseTracker::new(ProjectLayout::new(dir.path())), dir)
    }

    #[test]
    fn test_catalog_follows_mode() {
        let dir = tempdir().unwrap();
        let builtin = dir.path().join(".phasewatch/builtin");
        fs::create_dir_all(&builtin).unwrap();
        fs::write(
            builtin.join("phases.yml"),
            "phases:\n  - id: 00-framework-init\n    name: Pick framework\n",
        )
        .unwrap();

        // No history: builtin catalog
        let tracker = PhaseTracker::new(ProjectLayout::new(dir.path()));
        let phases = tracker.phases();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].id, "00-framework-init");

        // History without config: error mode, empty catalog
        fs::write(dir.path().join(".phasewatch-history.yml"), "[]\n").unwrap();
        assert_eq!(tracker.mode().mode, Mode::Error);
        assert!(tracker.phases().is_empty());
    }

    #[test]
    fn test_framework_catalog_from_manifest() {
        let (tracker, _dir) = framework_project();
        let phases = tracker.phases();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].id, "p1");
    }

    #[test]
    fn test_derived_state_replays_log() {
        let (tracker, dir) = framework_project();
        let state = tracker.derived_state();
        assert_eq!(state.current_phase.as_deref(), Some("p1"));

        fs::write(
            dir.path().join(".phasewatch-history.yml"),
            "- phase: p1\n  status: complete\n  timestamp: t1\n",
        )
        .unwrap();
        let state = tracker.derived_state();
        assert_eq!(state.current_phase.as_deref(), Some("p2"));
        assert_eq!(state.completed, vec!["p1"]);
    }

    #[test]
    fn test_derived_state_forced_phase_without_history() {
        let dir = tempdir().unwrap();
        let tracker = PhaseTracker::new(ProjectLayout::new(dir.path()));
        let state = tracker.derived_state();
        assert_eq!(state.current_phase.as_deref(), Some(PHASE_FRAMEWORK_INIT));
    }

    #[test]
    fn test_named_history_falls_back_to_raw_id() {
        let (tracker, dir) = framework_project();
        fs::write(
            dir.path().join(".phasewatch-history.yml"),
            "- phase: p1\n  status: complete\n  timestamp: t1\n- phase: gone\n  status: reject\n  timestamp: t2\n",
        )
        .unwrap();
        let named = tracker.named_history();
        assert_eq!(named[0].phase_name, "Design");
        assert_eq!(named[1].phase_name, "gone");
    }
}
