//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.

use std::io::ErrorKind;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_core::{StoreError, ValidationError};
use serde_json::json;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Missing or wrong admin credentials (401)
    Unauthorized,

    /// Admin writes disabled (403)
    Forbidden { reason: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Identifier already taken (409)
    Conflict { message: String },

    /// Store failure (500, logged)
    Store(StoreError),

    /// Request body could not be read as an app payload (400)
    BadRequest { message: String },
}

fn store_message(e: &StoreError) -> &'static str {
    match e {
        StoreError::Io { source, .. } if source.kind() == ErrorKind::PermissionDenied => {
            "Permission denied by the app store."
        }
        StoreError::Io { .. } => "The app store is unavailable.",
        StoreError::Corrupt { .. } => "The app store file is corrupt.",
        StoreError::NotFound { .. } | StoreError::Duplicate { .. } => {
            "The app store rejected the request."
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "Permission denied. Please sign in as admin."
                }),
            ),
            Self::Forbidden { reason } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "forbidden",
                    "message": reason
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Store(e) => {
                // Log the actual error, return a message without paths
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "store_error",
                        "message": store_message(e)
                    }),
                )
            }
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": message
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { id } => Self::NotFound { resource: "app", id },
            StoreError::Duplicate { .. } => Self::Conflict {
                message: "App ID already exists".to_string(),
            },
            _ => Self::Store(e),
        }
    }
}
