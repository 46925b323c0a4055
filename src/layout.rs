//! On-disk layout of a phasewatch-managed project.
//!
//! The project root owns two files: the configuration document and the
//! history log. Everything else lives under the `.phasewatch/` tool
//! directory: the built-in phase catalog and prompts, and the optional
//! framework directory with its manifest.

use std::path::{Path, PathBuf};

/// Project configuration document, owned by the surrounding project.
pub const CONFIG_FILE: &str = "project-config.yml";
/// Append-only history log, the sole source of truth for derived state.
pub const HISTORY_FILE: &str = ".phasewatch-history.yml";
/// Tool directory holding the built-in catalog and the framework.
pub const TOOL_DIR: &str = ".phasewatch";
/// Framework manifest file name inside the framework directory.
pub const MANIFEST_FILE: &str = "framework.yml";

/// Resolved paths for one project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub config_file: PathBuf,
    pub history_file: PathBuf,
    pub builtin_dir: PathBuf,
    pub framework_dir: PathBuf,
}

impl ProjectLayout {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let tool_dir = project_dir.join(TOOL_DIR);
        Self {
            config_file: project_dir.join(CONFIG_FILE),
            history_file: project_dir.join(HISTORY_FILE),
            builtin_dir: tool_dir.join("builtin"),
            framework_dir: tool_dir.join("framework"),
            project_dir,
        }
    }

    pub fn builtin_phases_file(&self) -> PathBuf {
        self.builtin_dir.join("phases.yml")
    }

    pub fn frameworks_file(&self) -> PathBuf {
        self.builtin_dir.join("frameworks.yml")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.framework_dir.join(MANIFEST_FILE)
    }

    /// Built-in prompt text, keyed by phase id with a fixed extension.
    pub fn builtin_prompt_file(&self, phase_id: &str) -> PathBuf {
        self.builtin_dir.join("prompts").join(format!("{phase_id}.md"))
    }

    /// Framework prompt text, declared as a path relative to the
    /// framework directory.
    pub fn framework_prompt_file(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.framework_dir.join(relative)
    }
}
