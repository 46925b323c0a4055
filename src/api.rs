//! REST API handlers for the phase dashboard.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use crate::history::{self, HistoryError};
use crate::layout::ProjectLayout;
use crate::prompt;
use crate::tracker::PhaseTracker;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub layout: ProjectLayout,
    /// Consumed by `POST /api/shutdown` to stop the server gracefully.
    pub shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Trackers are request-scoped: every request re-reads the documents.
    fn tracker(&self) -> PhaseTracker {
        PhaseTracker::new(self.layout.clone())
    }
}

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InterveneRequest {
    pub phase: Option<String>,
    pub status: Option<String>,
    pub comment: Option<String>,
    pub target: Option<String>,
}

#[derive(Deserialize)]
pub struct PollParams {
    pub since: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/prompt/{phase_id}", get(get_prompt))
        .route("/api/history", get(get_history))
        .route("/api/poll", get(poll))
        .route("/api/intervene", post(intervene))
        .route("/api/reset", post(reset))
        .route("/api/shutdown", post(shutdown))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Full dashboard state: phases with completed/current flags, the
/// derived state, mode, framework identity, and the raw config.
async fn get_state(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let tracker = state.tracker();
    let decision = tracker.mode();

    if let Some(error) = decision.error {
        return Json(json!({
            "error": error,
            "phases": [],
            "current_phase": null,
            "mode": decision.mode,
        }));
    }

    let derived = tracker.derived_state();
    let store = tracker.store();
    let config = store.load_config();
    let manifest = store.load_manifest();
    let phases: Vec<serde_json::Value> = tracker
        .phases_for(&decision)
        .into_iter()
        .map(|phase| {
            let completed = derived.completed.contains(&phase.id);
            let current = derived.current_phase.as_deref() == Some(phase.id.as_str());
            let mut value = serde_json::to_value(&phase).unwrap_or(json!({}));
            if let Some(obj) = value.as_object_mut() {
                obj.insert("completed".into(), json!(completed));
                obj.insert("current".into(), json!(current));
            }
            value
        })
        .collect();

    Json(json!({
        "phases": phases,
        "current_phase": derived.current_phase,
        "frozen": derived.frozen,
        "mode": decision.mode,
        "framework": manifest.map(|m| m.meta),
        "last_updated": history::now_timestamp(),
        "config": serde_json::to_value(&config).unwrap_or(serde_json::Value::Null),
    }))
}

async fn get_prompt(
    State(state): State<SharedState>,
    Path(phase_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tracker = state.tracker();
    let content = prompt::render(tracker.store(), &phase_id)
        .map_err(|_| ApiError::NotFound("Prompt not found".into()))?;
    Ok(Json(json!({"content": content})))
}

async fn get_history(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let tracker = state.tracker();
    Json(json!({"history": tracker.named_history()}))
}

/// Cheap change detection for the dashboard. Timestamps compare as
/// strings; valid because entries are appended from one monotonic clock.
async fn poll(
    State(state): State<SharedState>,
    Query(params): Query<PollParams>,
) -> Json<serde_json::Value> {
    let tracker = state.tracker();
    let decision = tracker.mode();
    if let Some(error) = decision.error {
        return Json(json!({"updated": true, "error": error}));
    }

    let history = tracker.store().load_history();
    let Some(latest) = history.last() else {
        return Json(json!({
            "updated": params.since.is_none(),
            "latestTimestamp": null,
        }));
    };

    let updated = match params.since.as_deref() {
        None => true,
        Some(since) => latest.timestamp.as_str() > since,
    };
    Json(json!({
        "updated": updated,
        "latestTimestamp": latest.timestamp,
    }))
}

async fn intervene(
    State(state): State<SharedState>,
    Json(req): Json<InterveneRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tracker = state.tracker();
    history::append_intervention(
        tracker.store(),
        req.phase.as_deref().unwrap_or(""),
        req.status.as_deref().unwrap_or(""),
        req.comment.as_deref(),
        req.target.as_deref(),
    )
    .map_err(|err| match err {
        HistoryError::MissingFields => ApiError::BadRequest("phase and status are required".into()),
        other => ApiError::Internal(other.to_string()),
    })?;
    Ok(Json(json!({"success": true})))
}

async fn reset(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    let tracker = state.tracker();
    history::reset(tracker.store()).map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(Json(json!({"success": true})))
}

async fn shutdown(State(state): State<SharedState>) -> Json<serde_json::Value> {
    if let Ok(mut guard) = state.shutdown.lock()
        && let Some(tx) = guard.take()
    {
        let _ = tx.send(());
    }
    Json(json!({"success": true, "message": "Server shutting down..."}))
}
