//! HTTP server for the phase dashboard.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    Router,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;

use crate::api::{self, AppState, SharedState};
use crate::embedded::Assets;
use crate::layout::ProjectLayout;
use crate::mode::{self, Mode};
use crate::store::DocumentStore;

/// Configuration for the dashboard server.
pub struct ServerConfig {
    pub port: u16,
    pub project_dir: std::path::PathBuf,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3100,
            project_dir: std::path::PathBuf::from("."),
            dev_mode: false,
        }
    }
}

/// Build the full application router with API and embedded dashboard.
pub fn build_router(state: SharedState) -> Router {
    api::api_router().fallback(static_handler).with_state(state)
}

/// Serve embedded static files, falling back to index.html.
async fn static_handler(req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');

    if !path.is_empty()
        && let Some(content) = Assets::get(path)
    {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return Response::builder()
            .header(header::CONTENT_TYPE, mime.as_ref())
            .body(Body::from(content.data.to_vec()))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
            .into_response();
    }

    match Assets::get("index.html") {
        Some(content) => Html(String::from_utf8_lossy(&content.data).to_string()).into_response(),
        None => (StatusCode::NOT_FOUND, "Dashboard not found.").into_response(),
    }
}

/// Start the dashboard server and block until shutdown.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let layout = ProjectLayout::new(&config.project_dir);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let state = Arc::new(AppState {
        layout: layout.clone(),
        shutdown: Mutex::new(Some(shutdown_tx)),
    });

    let mut app = build_router(state);
    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let host = if config.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local_addr = listener.local_addr()?;

    println!("phasewatch running at http://{}", local_addr);
    println!("Project root: {}", layout.project_dir.display());
    println!("Mode: {}", mode_banner(&layout));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

fn mode_banner(layout: &ProjectLayout) -> String {
    let store = DocumentStore::new(layout.clone());
    let decision = mode::resolve(&store);
    match decision.mode {
        Mode::Framework => format!(
            "framework ({})",
            store
                .load_manifest()
                .map(|m| m.meta.name)
                .unwrap_or_else(|| "unknown".into())
        ),
        Mode::Builtin => "built-in (setup)".to_string(),
        Mode::Error => match decision.error {
            Some(error) => format!("error: {}", error),
            None => "error".to_string(),
        },
    }
}

async fn shutdown_signal(shutdown_rx: oneshot::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        _ = shutdown_rx => {
            println!("\nShutdown requested via API...");
        }
    }
}
