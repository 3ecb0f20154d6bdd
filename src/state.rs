//! Shared request state

use crate::auth::JwtHandler;
use crate::db::Database;
use std::sync::Arc;

/// Application state handed to every handler and gate
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AppState {
    pub fn new(db: Database, jwt_handler: Arc<JwtHandler>) -> Self {
        Self { db, jwt_handler }
    }
}
