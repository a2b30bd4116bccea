//! Serve a built site without watching or rebuilding.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::ConfigFile;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, dir: Option<PathBuf>, open: bool) -> Result<()> {
    let dir = site_dir(config_path, dir)?;

    if !dir.is_dir() {
        anyhow::bail!(
            "No built site at {}. Run 'folio build' first.",
            dir.display()
        );
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    if open {
        let _ = open::that(format!("http://{}", addr));
    }

    let app = Router::new().fallback_service(ServeDir::new(&dir));
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Directory to serve: `--dir` if given, else the configured output directory.
fn site_dir(config_path: &Path, dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(ConfigFile::load(config_path)?.into_site_config().output_dir),
    }
}
