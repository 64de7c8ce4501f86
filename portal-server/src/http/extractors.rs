//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use portal_core::validation::validate_id;
use portal_core::ValidationError;

use super::error::ApiError;
use super::server::AppState;

/// Header naming who performed an admin write (audit only)
pub const ACTOR_HEADER: &str = "x-portal-user";

const DEFAULT_ACTOR: &str = "admin";

/// Extract and validate an app id from path
pub struct ValidAppId(pub String);

impl<S> FromRequestParts<S> for ValidAppId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        validate_id(&id)?;
        Ok(Self(id))
    }
}

/// Compare tokens without stopping at the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Admin capability: a request carrying the configured bearer token.
pub struct AdminAuth {
    /// Audit identity for created_by/updated_by
    pub actor: String,
}

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(ApiError::Forbidden {
                reason: "admin writes are disabled (no admin token configured)".to_string(),
            });
        };

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        if !presented.is_some_and(|p| tokens_match(p, expected)) {
            tracing::warn!("rejected admin request with missing or invalid token");
            return Err(ApiError::Unauthorized);
        }

        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ACTOR)
            .to_string();

        Ok(Self { actor })
    }
}
