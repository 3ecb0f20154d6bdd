//! Admin user management

use crate::auth::{
    models::{CreateUserRequest, NewUser, UserResponse, UserRole},
    validation::validate_registration,
};
use crate::db::query::{UserListParams, UserQuery};
use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::models::UserSummary;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserListParams>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let query = UserQuery::try_from(params)?;
    Ok(Json(state.db.list_users(&query)?))
}

/// POST /api/users (admin)
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_registration(
        &payload.name,
        &payload.email,
        &payload.password,
        payload.address.as_deref(),
    )?;

    let user = state
        .db
        .create_user(&NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            address: payload.address,
            role: payload.role.unwrap_or(UserRole::User),
        })?
        .ok_or(ApiError::UserExists)?;

    info!("Admin created user {} ({})", user.id, user.role.as_str());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": UserResponse::from_user(&user),
        })),
    ))
}
