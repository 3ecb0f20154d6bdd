//! Rating endpoints

use crate::auth::models::Principal;
use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::ratings::RatingSubmission;
use crate::state::AppState;
use axum::{
    extract::State,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// POST /api/ratings (any authenticated user)
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(submission): ApiJson<RatingSubmission>,
) -> Result<Json<Value>, ApiError> {
    let (store_id, rating) = submission.parse()?;

    state
        .db
        .upsert_rating(principal.id, store_id, rating)?
        .ok_or(ApiError::NotFound("Store not found"))?;

    Ok(Json(json!({ "message": "Rating submitted successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnRatingParams {
    pub store_id: i64,
}

/// GET /api/ratings?storeId=N - the caller's own rating for a store
pub async fn get_own_rating(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<OwnRatingParams>,
) -> Result<Json<Value>, ApiError> {
    let record = state.db.get_rating(principal.id, params.store_id)?;

    Ok(Json(json!({
        "storeId": params.store_id,
        "rating": record.as_ref().map(|r| r.rating),
        "createdAt": record.map(|r| r.created_at),
    })))
}
