//! Authentication API Endpoints
//! Mission: Registration, login and self-service password changes

use crate::auth::{
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, NewUser, Principal, RegisterRequest,
        User, UserResponse, UserRole,
    },
    validation::{validate_password, validate_registration, ValidationError},
};
use crate::db::PasswordChange;
use crate::error::{ApiError, ApiJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Register endpoint - POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
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
            role: UserRole::User,
        })?
        .ok_or(ApiError::UserExists)?;

    info!("Registered user {}", user.id);

    let response = auth_response(&state, &user, "User created successfully")?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(user) = state
        .db
        .verify_credentials(&payload.email, &payload.password)?
    else {
        warn!("Failed login attempt");
        return Err(ApiError::InvalidCredentials);
    };

    info!("Login successful: user {} ({})", user.id, user.role.as_str());

    Ok(Json(auth_response(&state, &user, "Login successful")?))
}

fn auth_response(
    state: &AppState,
    user: &User,
    message: &'static str,
) -> Result<AuthResponse, ApiError> {
    let token = state.jwt_handler.issue(user.id)?;

    Ok(AuthResponse {
        message,
        user: UserResponse::from_user(user),
        token,
        expires_in: state.jwt_handler.expires_in(),
    })
}

/// Get current user info - GET /api/me
pub async fn get_current_user(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}

/// Change own password - PUT /api/users/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    validate_password(&payload.new_password).map_err(ValidationError::from)?;

    match state.db.change_password(
        principal.id,
        &payload.current_password,
        &payload.new_password,
    )? {
        PasswordChange::Updated => Ok(Json(json!({ "message": "Password updated successfully" }))),
        PasswordChange::UserNotFound => Err(ApiError::NotFound("User not found")),
        PasswordChange::IncorrectPassword => {
            warn!(user_id = principal.id, "Password change with wrong current password");
            Err(ApiError::IncorrectPassword)
        }
    }
}
