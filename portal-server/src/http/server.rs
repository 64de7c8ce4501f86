//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Static assets under /assets
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use portal_core::{DocumentStore, Loader, PortalState, Renderer, SourceTag};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Directory whose `assets/` subdirectory is served at /assets
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            static_dir: PathBuf::from("public"),
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Authoritative entry list and heading
    pub portal: RwLock<PortalState>,
    pub loader: Loader,
    pub store: Arc<dyn DocumentStore>,
    pub renderer: Renderer,
    /// Bearer token for admin routes; `None` disables admin writes
    pub admin_token: Option<String>,
    /// Generation handed to the most recently started reload
    started: AtomicU64,
    /// Generation of the reload whose result is in `portal`; written under its lock
    applied: AtomicU64,
}

impl AppState {
    pub fn new(
        portal: PortalState,
        loader: Loader,
        store: Arc<dyn DocumentStore>,
        renderer: Renderer,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            portal: RwLock::new(portal),
            loader,
            store,
            renderer,
            admin_token,
            started: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Re-run the loader and replace the entry list.
    ///
    /// The state lock is only taken to swap in the result, so requests keep
    /// being served while sources are tried. Overlapping reloads resolve in
    /// start order: a result is dropped once a later-started reload has been
    /// applied. Returns the source of the list now being served.
    pub async fn reload(&self) -> SourceTag {
        let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        let resolution = self.loader.resolve_entries().await;

        let mut portal = self.portal.write().await;
        if generation < self.applied.load(Ordering::SeqCst) {
            tracing::debug!(generation, "discarding stale reload result");
            return portal.source();
        }

        portal.apply(resolution);
        self.applied.store(generation, Ordering::SeqCst);
        portal.source()
    }
}

/// Build the router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        let port = config.bind_addr.port();
        let origins = [
            format!("http://localhost:{port}"),
            format!("http://127.0.0.1:{port}"),
        ]
        .into_iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::portal::router())
        .merge(routes::apps::router())
        .merge(routes::admin::router())
        .nest_service("/assets", ServeDir::new(config.static_dir.join("assets")))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// The initial load runs in the background; until it completes the portal
/// renders with an empty list.
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(state);
    let app = build_router(state.clone(), &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    let loading = state.clone();
    tokio::spawn(async move {
        let source = loading.reload().await;
        tracing::info!(%source, "initial app list loaded");
    });

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
