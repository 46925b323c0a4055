//! Mode resolution: classify the project's setup state.
//!
//! The decision is a pure function of a [`SetupSnapshot`], evaluated as
//! an ordered chain of mutually exclusive predicates (first match wins):
//!
//! | # | Condition                                   | Result                          |
//! |---|---------------------------------------------|---------------------------------|
//! | 1 | no history log                              | builtin, start framework-init   |
//! | 2 | history but no config                       | error: config_missing           |
//! | 3 | config without framework.id                 | builtin, start framework-init   |
//! | 4 | framework.id set but framework not installed| builtin, start framework-setup  |
//! | 5 | manifest meta.id differs from framework.id  | error: framework_mismatch       |
//! | 6 | otherwise                                   | framework                       |
//!
//! `error` is a first-class mode value consumed by callers, never an
//! `Err`. Snapshots are captured fresh per call; documents may change
//! between requests and nothing here is cached.

use serde::Serialize;
use thiserror::Error;

use crate::phase::{PHASE_FRAMEWORK_INIT, PHASE_FRAMEWORK_SETUP};
use crate::store::{self, DocumentStore};

/// Coarse classification of the project's setup state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Builtin,
    Framework,
    Error,
}

/// Consistency errors surfaced to callers as mode values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum SetupError {
    #[error("history log exists but the configuration document is missing")]
    ConfigMissing,
    #[error("framework manifest id does not match the configured framework.id")]
    FrameworkMismatch,
}

/// Document-existence facts the decision table runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSnapshot {
    pub history_exists: bool,
    pub config_exists: bool,
    pub framework_present: bool,
    /// The configuration's `framework.id`, when set and non-empty.
    pub configured_framework: Option<String>,
    /// The manifest's `meta.id`, when the framework is present and parses.
    pub manifest_id: Option<String>,
}

impl SetupSnapshot {
    /// Read the current document states. A malformed config counts as
    /// having no `framework.id`; a malformed manifest counts as a
    /// mismatching one.
    pub fn capture(store: &DocumentStore) -> Self {
        let config = store.load_config();
        let framework_present = store.framework_present();
        let manifest_id = if framework_present {
            store.load_manifest().map(|m| m.meta.id)
        } else {
            None
        };
        Self {
            history_exists: store.history_exists(),
            config_exists: store.config_exists(),
            framework_present,
            configured_framework: store::string_at(&config, "framework.id"),
            manifest_id,
        }
    }
}

/// Resolved mode plus the forced start phase or the consistency error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: Mode,
    /// Start phase forced by setup state (builtin mode only).
    pub start_phase: Option<&'static str>,
    pub error: Option<SetupError>,
}

impl ModeDecision {
    fn builtin(start_phase: &'static str) -> Self {
        Self {
            mode: Mode::Builtin,
            start_phase: Some(start_phase),
            error: None,
        }
    }

    fn framework() -> Self {
        Self {
            mode: Mode::Framework,
            start_phase: None,
            error: None,
        }
    }

    fn error(error: SetupError) -> Self {
        Self {
            mode: Mode::Error,
            start_phase: None,
            error: Some(error),
        }
    }
}

/// The decision table. Pure and side-effect-free.
pub fn decide(snapshot: &SetupSnapshot) -> ModeDecision {
    if !snapshot.history_exists {
        return ModeDecision::builtin(PHASE_FRAMEWORK_INIT);
    }
    if !snapshot.config_exists {
        return ModeDecision::error(SetupError::ConfigMissing);
    }
    let Some(configured) = &snapshot.configured_framework else {
        return ModeDecision::builtin(PHASE_FRAMEWORK_INIT);
    };
    if !snapshot.framework_present {
        return ModeDecision::builtin(PHASE_FRAMEWORK_SETUP);
    }
    if snapshot.manifest_id.as_ref() != Some(configured) {
        return ModeDecision::error(SetupError::FrameworkMismatch);
    }
    ModeDecision::framework()
}

/// Capture a fresh snapshot and decide.
pub fn resolve(store: &DocumentStore) -> ModeDecision {
    decide(&SetupSnapshot::capture(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ProjectLayout;
    use std::fs;
    use tempfile::tempdir;

    fn snapshot(
        history: bool,
        config: bool,
        framework: bool,
        configured: Option<&str>,
        manifest: Option<&str>,
    ) -> SetupSnapshot {
        SetupSnapshot {
            history_exists: history,
            config_exists: config,
            framework_present: framework,
            configured_framework: configured.map(str::to_string),
            manifest_id: manifest.map(str::to_string),
        }
    }

    #[test]
    fn test_row1_no_history_forces_framework_init() {
        // Row 1 wins regardless of everything else
        for config in [false, true] {
            for framework in [false, true] {
                let decision =
                    decide(&snapshot(false, config, framework, Some("f1"), Some("f1")));
                assert_eq!(decision.mode, Mode::Builtin);
                assert_eq!(decision.start_phase, Some(PHASE_FRAMEWORK_INIT));
                assert!(decision.error.is_none());
            }
        }
    }

    #[test]
    fn test_row2_history_without_config_is_error() {
        let decision = decide(&snapshot(true, false, true, Some("f1"), Some("f1")));
        assert_eq!(decision.mode, Mode::Error);
        assert_eq!(decision.error, Some(SetupError::ConfigMissing));
        assert!(decision.start_phase.is_none());
    }

    #[test]
    fn test_row3_config_without_framework_id() {
        let decision = decide(&snapshot(true, true, true, None, Some("f1")));
        assert_eq!(decision.mode, Mode::Builtin);
        assert_eq!(decision.start_phase, Some(PHASE_FRAMEWORK_INIT));
    }

    #[test]
    fn test_row4_framework_id_without_installed_framework() {
        let decision = decide(&snapshot(true, true, false, Some("f1"), None));
        assert_eq!(decision.mode, Mode::Builtin);
        assert_eq!(decision.start_phase, Some(PHASE_FRAMEWORK_SETUP));
    }

    #[test]
    fn test_row5_manifest_id_mismatch() {
        let decision = decide(&snapshot(true, true, true, Some("f1"), Some("f2")));
        assert_eq!(decision.mode, Mode::Error);
        assert_eq!(decision.error, Some(SetupError::FrameworkMismatch));

        // An unreadable manifest also mismatches
        let decision = decide(&snapshot(true, true, true, Some("f1"), None));
        assert_eq!(decision.error, Some(SetupError::FrameworkMismatch));
    }

    #[test]
    fn test_row6_everything_consistent() {
        let decision = decide(&snapshot(true, true, true, Some("f1"), Some("f1")));
        assert_eq!(decision.mode, Mode::Framework);
        assert!(decision.start_phase.is_none());
        assert!(decision.error.is_none());
    }

    #[test]
    fn test_table_is_exhaustive_and_exclusive() {
        // Every existence combination lands on exactly one row.
        for history in [false, true] {
            for config in [false, true] {
                for framework in [false, true] {
                    for configured in [None, Some("f1")] {
                        for manifest in [None, Some("f1"), Some("f2")] {
                            let decision = decide(&snapshot(
                                history, config, framework, configured, manifest,
                            ));
                            match decision.mode {
                                Mode::Error => {
                                    assert!(decision.error.is_some());
                                    assert!(decision.start_phase.is_none());
                                }
                                Mode::Builtin => {
                                    assert!(decision.start_phase.is_some());
                                    assert!(decision.error.is_none());
                                }
                                Mode::Framework => {
                                    assert!(decision.start_phase.is_none());
                                    assert!(decision.error.is_none());
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_decide_is_deterministic() {
        let snap = snapshot(true, true, true, Some("f1"), Some("f1"));
        assert_eq!(decide(&snap), decide(&snap));
    }

    #[test]
    fn test_capture_reads_fresh_document_state() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(ProjectLayout::new(dir.path()));

        // No documents at all: row 1
        assert_eq!(resolve(&store).start_phase, Some(PHASE_FRAMEWORK_INIT));

        // History appears, still no config: row 2
        fs::write(dir.path().join(".phasewatch-history.yml"), "[]\n").unwrap();
        assert_eq!(resolve(&store).error, Some(SetupError::ConfigMissing));

        // Config without framework.id: row 3
        fs::write(dir.path().join("project-config.yml"), "project:\n  name: demo\n").unwrap();
        assert_eq!(resolve(&store).start_phase, Some(PHASE_FRAMEWORK_INIT));

        // framework.id configured but nothing installed: row 4
        fs::write(
            dir.path().join("project-config.yml"),
            "framework:\n  id: web-app\n",
        )
        .unwrap();
        assert_eq!(resolve(&store).start_phase, Some(PHASE_FRAMEWORK_SETUP));

        // Mismatching manifest: row 5
        let framework_dir = dir.path().join(".phasewatch/framework");
        fs::create_dir_all(&framework_dir).unwrap();
        fs::write(
            framework_dir.join("framework.yml"),
            "meta:\n  id: other\n  name: Other\n",
        )
        .unwrap();
        assert_eq!(resolve(&store).error, Some(SetupError::FrameworkMismatch));

        // Matching manifest: row 6
        fs::write(
            framework_dir.join("framework.yml"),
            "meta:\n  id: web-app\n  name: Web App\n",
        )
        .unwrap();
        assert_eq!(resolve(&store).mode, Mode::Framework);
    }

    #[test]
    fn test_serialized_wire_values() {
        assert_eq!(serde_json::to_value(Mode::Builtin).unwrap(), "builtin");
        assert_eq!(serde_json::to_value(Mode::Error).unwrap(), "error");
        assert_eq!(
            serde_json::to_value(SetupError::ConfigMissing).unwrap(),
            "config_missing"
        );
        assert_eq!(
            serde_json::to_value(SetupError::FrameworkMismatch).unwrap(),
            "framework_mismatch"
        );
    }
}
