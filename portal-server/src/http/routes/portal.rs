//! Launcher page and the apps document

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use portal_core::render::CONTAINER_PATH;
use portal_core::AppsDocument;
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// `?q=` search term
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET / - full portal page, filtered by `q`
async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let portal = state.portal.read().await;
    Html(state.renderer.render_page(&portal, &params.q))
}

/// GET /partials/apps - just the button container, for live search
async fn container(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let portal = state.portal.read().await;
    Html(state.renderer.render_container(&portal, &params.q))
}

/// GET /apps.json - the store's records as a plain apps document
async fn apps_document(State(state): State<Arc<AppState>>) -> Result<Json<AppsDocument>, ApiError> {
    let doc = state.store.document().await?;
    Ok(Json(doc))
}

/// Portal routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route(CONTAINER_PATH, get(container))
        .route("/apps.json", get(apps_document))
}
