//! Health check endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use portal_core::SourceTag;
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Where the current list came from (`none` before the first load)
    pub source: SourceTag,
    pub apps: usize,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let portal = state.portal.read().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        source: portal.source(),
        apps: portal.entries().len(),
    })
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::empty_state;

    #[tokio::test]
    async fn health_returns_ok_before_first_load() {
        let (_dir, state) = empty_state();
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.source, SourceTag::None);
        assert_eq!(body.apps, 0);
    }
}
