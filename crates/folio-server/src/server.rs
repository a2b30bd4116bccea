//! Development server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;

use folio_site::{BuildError, BuildResult, SiteBuilder, SiteConfig};

use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{
    live_reload_script, ReloadHub, ReloadMessage, LIVE_RELOAD_SCRIPT_PATH, LIVE_RELOAD_WS_PATH,
};

/// Configuration for the development server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Site to build and serve
    pub site: SiteConfig,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Build task failed: {0}")]
    Task(String),
}

/// Shared server state.
struct ServerState {
    builder: Arc<SiteBuilder>,
    hub: ReloadHub,
    /// Held for the duration of a rebuild
    rebuild_lock: Mutex<()>,
}

/// Development server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new development server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Build the site, then serve it and rebuild on changes until the process exits.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let mut site = self.config.site.clone();
        site.live_reload = Some(LIVE_RELOAD_SCRIPT_PATH.to_string());
        let input_dir = site.input_dir.clone();
        let output_dir = site.output_dir.clone();

        let state = Arc::new(ServerState {
            builder: Arc::new(SiteBuilder::new(site)),
            hub: ReloadHub::new(),
            rebuild_lock: Mutex::new(()),
        });

        // The watcher needs the output directory to exist to ignore it
        match rebuild(&state).await {
            Ok(result) => log_build(&result),
            Err(e) => tracing::error!("Initial build failed: {}", e),
        }

        // Set up file watcher
        let ignored: Vec<PathBuf> = vec![output_dir.clone(), input_dir.join(".git")];
        let (watcher, mut rx) = FileWatcher::new(&[input_dir], &ignored)
            .map_err(|e| ServerError::WatchError(e.to_string()))?;

        // Spawn file watch handler
        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        // Build router
        let app = Router::new()
            .route(LIVE_RELOAD_WS_PATH, get(ws_handler))
            .route(LIVE_RELOAD_SCRIPT_PATH, get(script_handler))
            .fallback_service(ServeDir::new(&output_dir))
            .with_state(state);

        tracing::info!("Starting dev server at http://{}", addr);

        // Open browser if configured
        if self.config.open {
            let url = format!("http://{}", addr);
            let _ = open::that(&url);
        }

        // Start server
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Run one full build off the async runtime.
async fn rebuild(state: &ServerState) -> Result<BuildResult, ServerError> {
    let _guard = state.rebuild_lock.lock().await;
    let builder = Arc::clone(&state.builder);

    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .map_err(|e| ServerError::Task(e.to_string()))??;

    Ok(result)
}

fn log_build(result: &BuildResult) {
    tracing::info!(
        "Built {} posts, {} pages and {} redirects in {}ms",
        result.posts,
        result.pages,
        result.redirects,
        result.duration_ms
    );
}

/// Handle file watch events.
async fn handle_watch_event(state: &ServerState, event: WatchEvent) {
    match &event {
        WatchEvent::ContentModified(path) => {
            tracing::info!("Content modified: {}", path.display());
        }
        WatchEvent::TemplateModified(path) => {
            tracing::info!("Template modified: {}", path.display());
        }
        WatchEvent::Created(_) | WatchEvent::Deleted(_) | WatchEvent::Modified(_) => {
            tracing::debug!("Changed: {}", event.path().display());
        }
    }

    // Every change gets a full rebuild; collections span all posts
    match rebuild(state).await {
        Ok(result) => {
            log_build(&result);
            state.hub.send(ReloadMessage::Reload);
        }
        Err(e) => {
            tracing::error!("Rebuild failed: {}", e);
            state.hub.send(ReloadMessage::BuildFailed {
                message: e.to_string(),
            });
        }
    }
}

/// Handler for the live reload WebSocket endpoint.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_ws(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.hub.subscribe();

    if send_message(&mut socket, &ReloadMessage::Connected)
        .await
        .is_err()
    {
        return;
    }

    // Forward reload messages to the browser
    while let Ok(msg) = rx.recv().await {
        if send_message(&mut socket, &msg).await.is_err() {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ReloadMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

/// Handler for the live reload client script.
async fn script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        live_reload_script(),
    )
}
