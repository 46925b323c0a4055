//! Phase and framework definitions.
//!
//! A phase catalog is an ordered list of `PhaseDefinition`s sourced from
//! either the built-in catalog (`builtin/phases.yml`) or the active
//! framework's manifest (`framework/framework.yml`). Catalogs are
//! externally authored and read fresh on every request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forced start phase when no framework is configured yet.
pub const PHASE_FRAMEWORK_INIT: &str = "00-framework-init";
/// Forced start phase when a framework is configured but not installed.
pub const PHASE_FRAMEWORK_SETUP: &str = "00-framework-setup";
/// Completing this phase sets the one-way frozen flag.
pub const PHASE_DESIGN_FREEZE: &str = "09-design-freeze";

/// A named stage of the tracked process with its successor candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Unique within a catalog.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Successor candidates, in preference order.
    #[serde(default)]
    pub next: Vec<String>,
    /// Prompt text path relative to the framework directory
    /// (framework catalogs only; built-in prompts are keyed by id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl PhaseDefinition {
    /// First successor, or `None` for a terminal phase.
    pub fn first_successor(&self) -> Option<&str> {
        self.next.first().map(String::as_str)
    }
}

/// Look up a phase definition by id.
pub fn find_phase<'a>(catalog: &'a [PhaseDefinition], id: &str) -> Option<&'a PhaseDefinition> {
    catalog.iter().find(|p| p.id == id)
}

/// Identity block of a framework manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMeta {
    pub id: String,
    pub name: String,
}

/// A framework's declaration of its identity, phase catalog, and
/// template variable bindings (placeholder name to dotted config path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkManifest {
    pub meta: ManifestMeta,
    #[serde(default)]
    pub phases: Vec<PhaseDefinition>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl FrameworkManifest {
    pub fn find_phase(&self, id: &str) -> Option<&PhaseDefinition> {
        find_phase(&self.phases, id)
    }
}

/// One entry of the built-in frameworks catalog (`builtin/frameworks.yml`),
/// rendered into the `{{FRAMEWORKS_LIST}}` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<PhaseDefinition> {
        vec![
            PhaseDefinition {
                id: "p1".into(),
                name: "Design".into(),
                next: vec!["p2".into()],
                prompt: None,
            },
            PhaseDefinition {
                id: "p2".into(),
                name: "Build".into(),
                next: vec![],
                prompt: Some("prompts/p2.md".into()),
            },
        ]
    }

    #[test]
    fn test_first_successor() {
        let catalog = catalog();
        assert_eq!(catalog[0].first_successor(), Some("p2"));
        assert_eq!(catalog[1].first_successor(), None);
    }

    #[test]
    fn test_find_phase() {
        let catalog = catalog();
        assert_eq!(find_phase(&catalog, "p2").map(|p| p.name.as_str()), Some("Build"));
        assert!(find_phase(&catalog, "p9").is_none());
    }

    #[test]
    fn test_phase_deserialization_with_defaults() {
        let yaml = "id: p1\nname: Design\n";
        let phase: PhaseDefinition = serde_yaml::from_str(yaml).unwrap();
        assert!(phase.next.is_empty());
        assert!(phase.prompt.is_none());
    }

    #[test]
    fn test_manifest_deserialization() {
        let yaml = r#"
meta:
  id: web-app
  name: Web Application
phases:
  - id: p1
    name: Design
    next: [p2]
variables:
  PROJECT_NAME: project.name
"#;
        let manifest: FrameworkManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.meta.id, "web-app");
        assert_eq!(manifest.phases.len(), 1);
        assert_eq!(
            manifest.variables.get("PROJECT_NAME").map(String::as_str),
            Some("project.name")
        );
        assert!(manifest.find_phase("p1").is_some());
    }
}
