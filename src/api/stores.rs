//! Store listing and admin store creation

use crate::auth::{
    models::UserRole,
    validation::{validate_address, validate_email, validate_store_name},
};
use crate::db::query::{StoreListParams, StoreQuery};
use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::models::{NewStore, Store, StoreSummary};
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// POST /api/stores body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
}

/// GET /api/stores (any authenticated user)
pub async fn list_stores(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<StoreListParams>,
) -> Result<Json<Vec<StoreSummary>>, ApiError> {
    let query = StoreQuery::try_from(params)?;
    Ok(Json(state.db.list_stores(&query)?))
}

/// POST /api/stores (admin)
pub async fn create_store(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    validate_store_name(&payload.name)?;
    validate_email(&payload.email)?;
    validate_address(payload.address.as_deref())?;

    if let Some(owner_id) = payload.owner_id {
        let owner = state.db.get_user_by_id(owner_id)?;
        if !matches!(owner, Some(ref u) if u.role == UserRole::StoreOwner) {
            return Err(ApiError::Validation(
                "Owner must be an existing store owner".to_string(),
            ));
        }
    }

    let store = state.db.create_store(&NewStore {
        name: payload.name.trim().to_string(),
        email: payload.email,
        address: payload.address,
        owner_id: payload.owner_id,
    })?;

    Ok((StatusCode::CREATED, Json(store)))
}
