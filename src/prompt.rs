//! Prompt loading and template-variable expansion.
//!
//! Expansion is a sequence of whole-token substitutions over the raw
//! text, each replacing every occurrence of a `{{NAME}}` placeholder.
//! Manifest-declared variables run first, then the fixed built-ins.
//! Unresolved placeholders are left verbatim; expansion never fails.

use std::fs;
use thiserror::Error;

use crate::mode::{self, Mode};
use crate::phase::{FrameworkListing, FrameworkManifest};
use crate::store::{DocumentStore, string_at};

/// Placeholder replaced with the rendered built-in frameworks catalog.
const VAR_FRAMEWORKS_LIST: &str = "{{FRAMEWORKS_LIST}}";
/// Placeholder replaced with the configuration's `framework.id`.
const VAR_FRAMEWORK_NAME: &str = "{{FRAMEWORK_NAME}}";
/// Placeholder replaced with the configuration's `framework.repo_url`.
const VAR_FRAMEWORK_REPO_URL: &str = "{{FRAMEWORK_REPO_URL}}";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no prompt found for phase {0}")]
    NotFound(String),
}

/// Resolve and read the raw instruction text for a phase.
///
/// Builtin mode reads from the built-in prompts directory keyed by phase
/// id; otherwise the active manifest's phase declares a path relative to
/// the framework directory. Missing phase, undeclared prompt, or absent
/// file all report not-found.
pub fn load_prompt(store: &DocumentStore, phase_id: &str) -> Result<String, PromptError> {
    let decision = mode::resolve(store);

    let path = match decision.mode {
        Mode::Builtin => Some(store.layout().builtin_prompt_file(phase_id)),
        _ => store
            .load_manifest()
            .as_ref()
            .and_then(|m| m.find_phase(phase_id))
            .and_then(|p| p.prompt.clone())
            .map(|rel| store.layout().framework_prompt_file(rel)),
    };

    let path = path
        .filter(|p| p.exists())
        .ok_or_else(|| PromptError::NotFound(phase_id.to_string()))?;

    fs::read_to_string(&path).map_err(|_| PromptError::NotFound(phase_id.to_string()))
}

/// Expand placeholder variables in prompt text.
///
/// Pass 1: every manifest variable whose dotted config path resolves to
/// a non-empty scalar. Pass 2: the fixed built-ins. A name collision
/// between the two sets resolves in favor of the pass that ran first.
pub fn expand(
    content: &str,
    config: &serde_yaml::Value,
    manifest: Option<&FrameworkManifest>,
    frameworks: &[FrameworkListing],
) -> String {
    let mut result = content.to_string();

    if let Some(manifest) = manifest {
        for (name, config_path) in &manifest.variables {
            if let Some(value) = string_at(config, config_path) {
                result = result.replace(&format!("{{{{{name}}}}}"), &value);
            }
        }
    }

    result = result.replace(VAR_FRAMEWORKS_LIST, &render_frameworks_list(frameworks));
    result = result.replace(
        VAR_FRAMEWORK_NAME,
        &string_at(config, "framework.id").unwrap_or_default(),
    );
    result.replace(
        VAR_FRAMEWORK_REPO_URL,
        &string_at(config, "framework.repo_url").unwrap_or_default(),
    )
}

/// Load and expand in one step, re-reading config and manifest fresh.
pub fn render(store: &DocumentStore, phase_id: &str) -> Result<String, PromptError> {
    let content = load_prompt(store, phase_id)?;
    let config = store.load_config();
    let manifest = store.load_manifest();
    let frameworks = store.load_frameworks_list();
    Ok(expand(&content, &config, manifest.as_ref(), &frameworks))
}

/// One block per catalog entry: display name, identifier, description,
/// comma-joined tags.
fn render_frameworks_list(frameworks: &[FrameworkListing]) -> String {
    frameworks
        .iter()
        .map(|f| {
            format!(
                "- **{}** ({})\n  {}\n  Tags: {}",
                f.name,
                f.id,
                f.description,
                f.tags.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
