//! portal-server: HTTP surface for the 32Gamers portal
//!
//! Serves the launcher page rendered from the loaded app list, the apps
//! document backed by the store, and token-gated admin CRUD.

pub mod http;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
