//! Document store: reads and writes the structured YAML documents.
//!
//! Every read degrades to an empty/default value on a missing file or a
//! parse failure. Parse failures are logged to the operational channel
//! and otherwise treated identically to missing documents; nothing here
//! propagates an error past the store boundary except history writes.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::history::HistoryEntry;
use crate::layout::ProjectLayout;
use crate::phase::{FrameworkListing, FrameworkManifest, PhaseDefinition};

#[derive(Debug, Clone)]
pub struct DocumentStore {
    layout: ProjectLayout,
}

#[derive(serde::Deserialize)]
struct PhasesDoc {
    #[serde(default)]
    phases: Vec<PhaseDefinition>,
}

#[derive(serde::Deserialize)]
struct FrameworksDoc {
    #[serde(default)]
    frameworks: Vec<FrameworkListing>,
}

impl DocumentStore {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn history_exists(&self) -> bool {
        self.layout.history_file.exists()
    }

    pub fn config_exists(&self) -> bool {
        self.layout.config_file.exists()
    }

    /// A framework is present only as a directory + manifest pair.
    pub fn framework_present(&self) -> bool {
        self.layout.framework_dir.exists() && self.layout.manifest_file().exists()
    }

    /// Free-form project configuration. `Value::Null` when missing or
    /// malformed.
    pub fn load_config(&self) -> serde_yaml::Value {
        read_yaml(&self.layout.config_file).unwrap_or(serde_yaml::Value::Null)
    }

    /// Full history in append order. Accepts either a top-level sequence
    /// or a mapping with a `history` key.
    pub fn load_history(&self) -> Vec<HistoryEntry> {
        let Some(value) = read_yaml::<serde_yaml::Value>(&self.layout.history_file) else {
            return Vec::new();
        };
        let entries = match &value {
            serde_yaml::Value::Sequence(_) => value,
            serde_yaml::Value::Mapping(_) => match value.get("history") {
                Some(inner) => inner.clone(),
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        match serde_yaml::from_value(entries) {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    path = %self.layout.history_file.display(),
                    error = %err,
                    "malformed history log, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Whole-document overwrite of the history log.
    pub fn save_history(&self, history: &[HistoryEntry]) -> Result<()> {
        let content = serde_yaml::to_string(&history).context("Failed to serialize history")?;
        fs::write(&self.layout.history_file, content).with_context(|| {
            format!(
                "Failed to write history log: {}",
                self.layout.history_file.display()
            )
        })
    }

    pub fn load_builtin_phases(&self) -> Vec<PhaseDefinition> {
        read_yaml::<PhasesDoc>(&self.layout.builtin_phases_file())
            .map(|doc| doc.phases)
            .unwrap_or_default()
    }

    pub fn load_manifest(&self) -> Option<FrameworkManifest> {
        read_yaml(&self.layout.manifest_file())
    }

    pub fn load_frameworks_list(&self) -> Vec<FrameworkListing> {
        read_yaml::<FrameworksDoc>(&self.layout.frameworks_file())
            .map(|doc| doc.frameworks)
            .unwrap_or_default()
    }
}

/// Resolve a dotted path (`framework.id`) against a YAML document.
/// Total: any missing or non-mapping segment yields `None`.
pub fn lookup_path<'a>(doc: &'a serde_yaml::Value, path: &str) -> Option<&'a serde_yaml::Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// String form of a scalar config value. Empty strings, null, and
/// structured values count as absent.
pub fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Dotted-path lookup yielding the scalar string form directly.
pub fn string_at(doc: &serde_yaml::Value, path: &str) -> Option<String> {
    lookup_path(doc, path).and_then(scalar_string)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read document");
            return None;
        }
    };
    match serde_yaml::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to parse document");
            None
        }
    }
}
