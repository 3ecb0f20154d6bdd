//! Authentication Middleware
//! Mission: Resolve the bearer token into a live principal on every protected request

use crate::auth::models::Principal;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde_json::json;
use tracing::{debug, error, warn};

/// Auth middleware: token -> user id -> current user record.
///
/// The user is re-read on every request, so role changes apply on the next
/// call even for outstanding tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;

    let user_id = state.jwt_handler.verify(&token).map_err(|e| {
        debug!(reason = %e, "Rejected bearer token");
        AuthError::InvalidOrExpiredToken
    })?;

    let user = state
        .db
        .get_user_by_id(user_id)
        .map_err(|e| {
            error!(error = ?e, "Failed to load token subject");
            AuthError::Internal
        })?
        .ok_or_else(|| {
            warn!(user_id, "Token subject no longer exists");
            AuthError::InvalidToken
        })?;

    // Add principal to request extensions so gates and handlers can access it
    req.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`; any other shape counts as absent
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extract principal from request (use after auth middleware)
pub fn extract_principal(req: &Request) -> Option<&Principal> {
    req.extensions().get::<Principal>()
}

/// Auth error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidOrExpiredToken,
    InvalidToken,
    Forbidden,
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            AuthError::InvalidOrExpiredToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
            AuthError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
