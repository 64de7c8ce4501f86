//! HTTP server command
//!
//! Runs the portal page, apps document and admin API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use portal_core::{DocumentStore, JsonFileStore, Loader, PortalConfig, PortalState, Renderer};
use portal_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: server.bind from config, 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: PortalConfig) -> Result<()> {
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    let store: Arc<dyn DocumentStore> = Arc::new(JsonFileStore::new(&config.store.path));
    let loader = Loader::from_config(&config, Some(store.clone()))
        .context("Failed to build loader from config")?;

    let server = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.server.bind),
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
        static_dir: config.server.static_dir.clone(),
    };

    tracing::info!(
        bind = %server.bind_addr,
        store = %config.store.path.display(),
        candidates = loader.candidates().len(),
        "starting portal server"
    );

    let state = AppState::new(
        PortalState::new(config.portal.title.clone()),
        loader,
        store,
        Renderer::new(config.portal.asset_base.clone()),
        config.server.admin_token.clone(),
    );

    // Blocks until shutdown
    run_server(state, server).await.context("Server error")?;

    Ok(())
}
