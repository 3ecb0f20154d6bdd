//! Rating Storage
//! Mission: At most one rating per (user, store), written atomically

use super::{now_timestamp, Database};
use crate::models::{OwnerRating, RatingRecord};
use crate::ratings::RatingValue;
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

fn rating_from_row(row: &Row<'_>) -> rusqlite::Result<RatingRecord> {
    Ok(RatingRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        store_id: row.get(2)?,
        rating: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Database {
    /// Insert a rating, or overwrite the value of the existing (user, store) row.
    ///
    /// One statement, so concurrent submissions for the same pair cannot
    /// produce duplicates or interleave a read with a write. `created_at`
    /// keeps its first-insert value. Returns `None` if the store does not exist.
    pub fn upsert_rating(
        &self,
        user_id: i64,
        store_id: i64,
        value: RatingValue,
    ) -> Result<Option<RatingRecord>> {
        let record = self
            .conn()
            .query_row(
                "INSERT INTO ratings (user_id, store_id, rating, created_at)
                 SELECT ?1, s.id, ?3, ?4 FROM stores s WHERE s.id = ?2
                 ON CONFLICT (user_id, store_id) DO UPDATE SET rating = excluded.rating
                 RETURNING id, user_id, store_id, rating, created_at",
                params![user_id, store_id, value.get(), now_timestamp()],
                rating_from_row,
            )
            .optional()
            .context("Failed to upsert rating")?;

        debug!(user_id, store_id, rating = value.get(), stored = record.is_some(), "Rating upsert");
        Ok(record)
    }

    /// A user's own rating for a store
    pub fn get_rating(&self, user_id: i64, store_id: i64) -> Result<Option<RatingRecord>> {
        self.conn()
            .query_row(
                "SELECT id, user_id, store_id, rating, created_at
                 FROM ratings WHERE user_id = ?1 AND store_id = ?2",
                params![user_id, store_id],
                rating_from_row,
            )
            .optional()
            .context("Failed to load rating")
    }

    /// Ratings for a store with rater names, newest first
    pub fn ratings_for_store(&self, store_id: i64) -> Result<Vec<OwnerRating>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.name, r.rating, r.created_at
             FROM ratings r
             JOIN users u ON u.id = r.user_id
             WHERE r.store_id = ?1
             ORDER BY r.created_at DESC, r.id DESC",
        )?;

        let ratings = stmt
            .query_map(params![store_id], |row| {
                Ok(OwnerRating {
                    name: row.get(0)?,
                    rating: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list store ratings")?;

        Ok(ratings)
    }

    /// Mean rating for a store, 0 when unrated
    pub fn average_rating(&self, store_id: i64) -> Result<f64> {
        self.conn()
            .query_row(
                "SELECT COALESCE(AVG(rating), 0.0) FROM ratings WHERE store_id = ?1",
                params![store_id],
                |row| row.get(0),
            )
            .context("Failed to compute average rating")
    }
}
