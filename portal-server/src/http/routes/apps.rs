//! Read-only view of the in-memory app list, plus admin-triggered reload

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use portal_core::{AppEntry, SourceTag};
use serde::Serialize;

use super::portal::SearchParams;
use crate::http::extractors::AdminAuth;
use crate::http::server::AppState;

/// Current list response
#[derive(Debug, Serialize)]
pub struct AppsResponse {
    pub title: String,
    pub source: SourceTag,
    pub failed: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Total entries before filtering
    pub total: usize,
    pub apps: Vec<AppEntry>,
}

/// Reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub source: SourceTag,
    pub apps: usize,
    pub failed: bool,
}

/// GET /api/apps - entries visible for `q`
async fn list_apps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<AppsResponse> {
    let portal = state.portal.read().await;

    Json(AppsResponse {
        title: portal.title().to_string(),
        source: portal.source(),
        failed: portal.failed(),
        loaded_at: portal.loaded_at(),
        total: portal.entries().len(),
        apps: portal.visible(&params.q).into_iter().cloned().collect(),
    })
}

/// POST /api/reload - re-run the loader (admin only)
async fn reload(_auth: AdminAuth, State(state): State<Arc<AppState>>) -> Json<ReloadResponse> {
    let source = state.reload().await;
    let portal = state.portal.read().await;
    tracing::info!(%source, apps = portal.entries().len(), "reloaded app list");

    Json(ReloadResponse {
        source,
        apps: portal.entries().len(),
        failed: portal.failed(),
    })
}

/// App list routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/apps", get(list_apps))
        .route("/api/reload", post(reload))
}
