//! Store and rating data structures shared by storage and the HTTP layer

use serde::{Deserialize, Serialize};

use crate::auth::models::UserRole;

/// Store record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: String,
}

/// Input for creating a store
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
}

/// Store row in listings, with the derived average
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
    pub average_rating: f64,
}

/// User row in admin listings; the average is over ratings the user gave
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: UserRole,
    pub average_rating: f64,
}

/// One persisted rating
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RatingRecord {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: u8,
    pub created_at: String,
}

/// Rating as shown to a store owner
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRating {
    pub name: String,
    pub rating: u8,
    pub created_at: String,
}

/// Platform-wide counts for the admin dashboard
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DashboardCounts {
    pub users: i64,
    pub stores: i64,
    pub ratings: i64,
}
