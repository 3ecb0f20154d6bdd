use axum::{
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::api::{dashboard, ratings, stores, users};
use crate::auth::{api as auth_api, auth_middleware, role_gate, RoleGate};
use crate::middleware::request_logging;
use crate::state::AppState;

/// Create the API router
///
/// Layer order on protected routes: auth gate (outermost) -> role gate -> handler,
/// so a principal always exists before roles are checked, and roles are
/// checked before the request body is parsed.
pub fn create_router(state: AppState) -> Router {
    let admin_only = || middleware::from_fn_with_state(RoleGate::ADMIN, role_gate);
    let owner_only = || middleware::from_fn_with_state(RoleGate::STORE_OWNER, role_gate);

    // Protected API routes
    let protected_routes = Router::new()
        .route(
            "/api/dashboard",
            get(dashboard::admin_dashboard).route_layer(admin_only()),
        )
        .route(
            "/api/stores",
            get(stores::list_stores).merge(post(stores::create_store).route_layer(admin_only())),
        )
        .route(
            "/api/ratings",
            get(ratings::get_own_rating).post(ratings::submit_rating),
        )
        .route(
            "/api/users",
            get(users::list_users)
                .post(users::create_user)
                .route_layer(admin_only()),
        )
        .route("/api/users/password", put(auth_api::change_password))
        .route(
            "/api/store-owner/dashboard",
            get(dashboard::owner_dashboard).route_layer(owner_only()),
        )
        .route("/api/me", get(auth_api::get_current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(auth_api::register))
        .route("/api/login", post(auth_api::login));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
