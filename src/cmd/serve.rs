//! Dashboard server command (`phasewatch serve`).

use anyhow::Result;
use std::path::Path;

use phasewatch::server::{ServerConfig, start_server};

pub async fn cmd_serve(project_dir: &Path, port: u16, open_browser: bool, dev: bool) -> Result<()> {
    // Spawn browser open before starting the server (which blocks).
    // Skip in dev mode.
    if open_browser && !dev {
        let url = format!("http://localhost:{}", port);
        tokio::spawn(async move {
            // Small delay to let the server start binding
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    start_server(ServerConfig {
        port,
        project_dir: project_dir.to_path_buf(),
        dev_mode: dev,
    })
    .await
}
