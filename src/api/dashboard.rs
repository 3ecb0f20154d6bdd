//! Admin and store-owner dashboards

use crate::auth::models::Principal;
use crate::error::ApiError;
use crate::models::{DashboardCounts, OwnerRating};
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use serde::Serialize;

/// GET /api/dashboard (admin)
pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardCounts>, ApiError> {
    Ok(Json(state.db.dashboard_counts()?))
}

#[derive(Debug, Serialize)]
pub struct OwnedStore {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub store: OwnedStore,
    pub ratings: Vec<OwnerRating>,
    /// One decimal place, e.g. "4.5"
    pub average_rating: String,
}

/// GET /api/store-owner/dashboard (store owner)
pub async fn owner_dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<OwnerDashboard>, ApiError> {
    let store = state
        .db
        .store_for_owner(principal.id)?
        .ok_or(ApiError::NotFound("Store not found for this owner"))?;

    let ratings = state.db.ratings_for_store(store.id)?;
    let average = state.db.average_rating(store.id)?;

    Ok(Json(OwnerDashboard {
        store: OwnedStore {
            id: store.id,
            name: store.name,
        },
        ratings,
        average_rating: format_average(average),
    }))
}

/// One decimal place, halves rounded away from zero (2.25 -> "2.3")
pub fn format_average(average: f64) -> String {
    format!("{:.1}", (average * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_average_rounds_halves_up() {
        assert_eq!(format_average(2.25), "2.3");
        assert_eq!(format_average(4.75), "4.8");
        assert_eq!(format_average(4.5), "4.5");
        assert_eq!(format_average(10.0 / 3.0), "3.3");
        assert_eq!(format_average(0.0), "0.0");
        assert_eq!(format_average(5.0), "5.0");
    }
}
