//! Store Storage

use super::query::like_pattern_opt;
use super::{now_timestamp, Database, StoreQuery};
use crate::models::{NewStore, Store, StoreSummary};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

const STORE_COLUMNS: &str = "id, name, email, address, owner_id, created_at";

fn store_from_row(row: &Row<'_>) -> rusqlite::Result<Store> {
    Ok(Store {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        address: row.get(3)?,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    /// Insert a store. Owner validity is checked by the caller.
    pub fn create_store(&self, new_store: &NewStore) -> Result<Store> {
        let created_at = now_timestamp();
        let conn = self.conn();

        conn.execute(
            "INSERT INTO stores (name, email, address, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_store.name,
                new_store.email,
                new_store.address,
                new_store.owner_id,
                created_at,
            ],
        )
        .context("Failed to insert store")?;

        let store = Store {
            id: conn.last_insert_rowid(),
            name: new_store.name.clone(),
            email: new_store.email.clone(),
            address: new_store.address.clone(),
            owner_id: new_store.owner_id,
            created_at,
        };

        info!("Created store {} (owner: {:?})", store.id, store.owner_id);
        Ok(store)
    }

    pub fn get_store(&self, store_id: i64) -> Result<Option<Store>> {
        self.conn()
            .query_row(
                &format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1"),
                params![store_id],
                store_from_row,
            )
            .optional()
            .context("Failed to load store")
    }

    /// The store owned by a user; the oldest one if there are several
    pub fn store_for_owner(&self, owner_id: i64) -> Result<Option<Store>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {STORE_COLUMNS} FROM stores WHERE owner_id = ?1 ORDER BY id LIMIT 1"
                ),
                params![owner_id],
                store_from_row,
            )
            .optional()
            .context("Failed to load store for owner")
    }

    /// List stores with search and sort
    pub fn list_stores(&self, query: &StoreQuery) -> Result<Vec<StoreSummary>> {
        let sql = format!(
            "SELECT s.id, s.name, s.email, s.address, s.owner_id,
                    COALESCE(AVG(r.rating), 0.0) AS average_rating
             FROM stores s
             LEFT JOIN ratings r ON r.store_id = s.id
             WHERE (?1 IS NULL
                    OR s.name LIKE ?1 ESCAPE '\\'
                    OR s.address LIKE ?1 ESCAPE '\\')
             GROUP BY s.id
             ORDER BY {} {}, s.id ASC",
            query.sort.as_sql(),
            query.order.as_sql()
        );

        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare store listing")?;

        let stores = stmt
            .query_map(params![like_pattern_opt(query.search.as_deref())], |row| {
                Ok(StoreSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    address: row.get(3)?,
                    owner_id: row.get(4)?,
                    average_rating: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list stores")?;

        Ok(stores)
    }
}
