//! History log entries and the manual-intervention mutator.
//!
//! The history is an append-only ordered sequence; entries are never
//! mutated or reordered. Timestamps are RFC-3339 UTC strings appended
//! from a single monotonic clock, so lexical comparison is a valid
//! proxy for chronological order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::DocumentStore;

/// Status value that marks a phase as done.
pub const STATUS_COMPLETE: &str = "complete";
/// Status value that re-opens a phase (the entry's `target` if present,
/// the entry's own phase otherwise).
pub const STATUS_REJECT: &str = "reject";
/// Prefix stamped onto comments recorded through manual intervention.
pub const MANUAL_MARKER: &str = "[manual intervention]";

/// One phase status-change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub phase: String,
    /// `complete`, `reject`, or any free-form marker such as `in_progress`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Only meaningful when status is `reject`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub timestamp: String,
}

/// A history entry enriched with the human-readable phase name resolved
/// from the active catalog (raw id fallback when no catalog entry matches).
#[derive(Debug, Clone, Serialize)]
pub struct NamedHistoryEntry {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    #[serde(rename = "phaseName")]
    pub phase_name: String,
}

/// Errors from history mutation.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("phase and status are required")]
    MissingFields,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Current clock reading in the log's timestamp format.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Validate and append a manual status-change entry.
///
/// Read-modify-write over the full log: prior entries are never touched.
/// The comment is prefixed with [`MANUAL_MARKER`]; `target` is copied only
/// for `reject` entries.
pub fn append_intervention(
    store: &DocumentStore,
    phase: &str,
    status: &str,
    comment: Option<&str>,
    target: Option<&str>,
) -> Result<HistoryEntry, HistoryError> {
    if phase.trim().is_empty() || status.trim().is_empty() {
        return Err(HistoryError::MissingFields);
    }

    let comment = match comment {
        Some(text) if !text.trim().is_empty() => format!("{MANUAL_MARKER} {text}"),
        _ => MANUAL_MARKER.to_string(),
    };

    let entry = HistoryEntry {
        phase: phase.to_string(),
        status: status.to_string(),
        comment: Some(comment),
        target: (status == STATUS_REJECT)
            .then(|| target.map(str::to_string))
            .flatten(),
        timestamp: now_timestamp(),
    };

    let mut history = store.load_history();
    history.push(entry.clone());
    store.save_history(&history)?;
    Ok(entry)
}

/// Replace the entire history with an empty sequence.
///
/// Destructive and irreversible; callers are expected to confirm first.
pub fn reset(store: &DocumentStore) -> Result<(), HistoryError> {
    store.save_history(&[])?;
    Ok(())
}
