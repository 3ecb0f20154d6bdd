//! SQLite Storage
//! Mission: One explicitly constructed handle for users, stores and ratings
//!
//! The handle wraps a single connection behind a mutex. It is created at
//! startup, cloned into request state and dropped at shutdown.

pub mod query;
mod ratings;
mod stores;
mod users;

pub use query::{SortOrder, StoreQuery, StoreSort, UserQuery, UserSort};
pub use users::PasswordChange;

use crate::models::DashboardCounts;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{ffi, Connection};
use std::sync::Arc;
use tracing::info;

/// Salt rounds used when none are configured
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Lowest and highest cost bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        address TEXT,
        role TEXT NOT NULL CHECK (role IN ('user', 'store_owner', 'admin')),
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS stores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        address TEXT,
        owner_id INTEGER REFERENCES users(id),
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS ratings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id),
        store_id INTEGER NOT NULL REFERENCES stores(id),
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        created_at TEXT NOT NULL,
        UNIQUE (user_id, store_id)
    );

    CREATE INDEX IF NOT EXISTS idx_ratings_store ON ratings(store_id);
    CREATE INDEX IF NOT EXISTS idx_stores_owner ON stores(owner_id);
";

/// Shared storage handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    bcrypt_cost: u32,
}

impl Database {
    /// Open (or create) a database file and initialize the schema
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database at {db_path}"))?;
        let db = Self::from_connection(conn)?;
        info!("Database ready at {}", db_path);
        Ok(db)
    }

    /// Private in-memory database, used by tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        })
    }

    /// Override the bcrypt cost used for new password hashes
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub(crate) fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Counts for the admin dashboard
    pub fn dashboard_counts(&self) -> Result<DashboardCounts> {
        let conn = self.conn();
        let count = |table: &str| -> Result<i64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to count {table}"))
        };

        Ok(DashboardCounts {
            users: count("users")?,
            stores: count("stores")?,
            ratings: count("ratings")?,
        })
    }
}

/// Timestamp format for `created_at` columns. Fixed width, so text order is time order.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// True when `err` is a constraint failure with the given extended code
pub(crate) fn is_constraint(err: &rusqlite::Error, extended_code: i32) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ffi::ErrorCode::ConstraintViolation && e.extended_code == extended_code
    )
}
