//! Credential Store
//! Mission: Persist user accounts with bcrypt-hashed passwords

use super::query::like_pattern_opt;
use super::{is_constraint, now_timestamp, Database, UserQuery};
use crate::auth::models::{NewUser, User, UserRole};
use crate::models::UserSummary;
use anyhow::{Context, Result};
use bcrypt::{hash, verify};
use rusqlite::{ffi, params, OptionalExtension, Row};
use tracing::{info, warn};

const USER_COLUMNS: &str = "id, name, email, password_hash, address, role, created_at";

/// Outcome of a self-service password change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChange {
    Updated,
    UserNotFound,
    IncorrectPassword,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        address: row.get(4)?,
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Get user by id
    pub fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                user_from_row,
            )
            .optional()
            .context("Failed to load user by id")
    }

    /// Get user by email (exact, case-sensitive match)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()
            .context("Failed to load user by email")
    }

    /// Create a new user. Returns `None` when the email is already taken.
    pub fn create_user(&self, new_user: &NewUser) -> Result<Option<User>> {
        if self.get_user_by_email(&new_user.email)?.is_some() {
            return Ok(None);
        }

        let password_hash =
            hash(&new_user.password, self.bcrypt_cost()).context("Failed to hash password")?;
        let created_at = now_timestamp();

        let conn = self.conn();
        let inserted = conn.execute(
            "INSERT INTO users (name, email, password_hash, address, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new_user.name,
                new_user.email,
                password_hash,
                new_user.address,
                new_user.role.as_str(),
                created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            // Lost a race with a concurrent registration for the same email
            Err(e) if is_constraint(&e, ffi::SQLITE_CONSTRAINT_UNIQUE) => return Ok(None),
            Err(e) => return Err(e).context("Failed to insert user"),
        }

        let user = User {
            id: conn.last_insert_rowid(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash,
            address: new_user.address.clone(),
            role: new_user.role,
            created_at,
        };

        info!("Created user {} ({})", user.id, user.role.as_str());

        Ok(Some(user))
    }

    /// Verify email and password, returning the user on success
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_user_by_email(email)? else {
            return Ok(None);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        Ok(valid.then_some(user))
    }

    /// Replace a user's password after checking the current one
    pub fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<PasswordChange> {
        let Some(user) = self.get_user_by_id(user_id)? else {
            return Ok(PasswordChange::UserNotFound);
        };

        let valid = verify(current_password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Ok(PasswordChange::IncorrectPassword);
        }

        let password_hash =
            hash(new_password, self.bcrypt_cost()).context("Failed to hash password")?;

        let updated = self
            .conn()
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, user_id],
            )
            .context("Failed to update password")?;

        if updated == 0 {
            return Ok(PasswordChange::UserNotFound);
        }

        info!("Password changed for user {}", user_id);
        Ok(PasswordChange::Updated)
    }

    /// List users with search, role filter and sort (admin only)
    pub fn list_users(&self, query: &UserQuery) -> Result<Vec<UserSummary>> {
        let sql = format!(
            "SELECT u.id, u.name, u.email, u.address, u.role,
                    COALESCE(AVG(r.rating), 0.0) AS average_rating
             FROM users u
             LEFT JOIN ratings r ON r.user_id = u.id
             WHERE (?1 IS NULL
                    OR u.name LIKE ?1 ESCAPE '\\'
                    OR u.email LIKE ?1 ESCAPE '\\'
                    OR u.address LIKE ?1 ESCAPE '\\')
               AND (?2 IS NULL OR u.role = ?2)
             GROUP BY u.id
             ORDER BY {} {}, u.id ASC",
            query.sort.as_sql(),
            query.order.as_sql()
        );

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql).context("Failed to prepare user listing")?;

        let users = stmt
            .query_map(
                params![
                    like_pattern_opt(query.search.as_deref()),
                    query.role.map(|r| r.as_str())
                ],
                |row| {
                    let role_str: String = row.get(4)?;
                    Ok(UserSummary {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        address: row.get(3)?,
                        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
                        average_rating: row.get(5)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list users")?;

        Ok(users)
    }

    /// Create the bootstrap admin when no admin account exists yet.
    /// Returns true if an account was created.
    pub fn ensure_admin(&self, name: &str, email: &str, password: &str) -> Result<bool> {
        let admins: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if admins > 0 {
            return Ok(false);
        }

        let created = self.create_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            address: None,
            role: UserRole::Admin,
        })?;

        if created.is_none() {
            warn!("Bootstrap admin email is already used by a non-admin account");
            return Ok(false);
        }

        info!("Bootstrap admin account created");
        Ok(true)
    }
}
