//! Runtime configuration
//!
//! Every setting can come from a flag or an environment variable; `.env`
//! files are loaded by the binary before parsing.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use crate::auth::jwt::DEFAULT_TOKEN_TTL_HOURS;
use crate::db::{DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Secrets shorter than this still work but are reported at startup.
pub const RECOMMENDED_SECRET_BYTES: usize = 32;

#[derive(Parser, Debug, Clone)]
#[command(name = "storerate")]
#[command(about = "StoreRate API server - users rate stores from 1 to 5")]
pub struct Config {
    /// HMAC secret for signing access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// SQLite database file; relative paths resolve against the crate directory
    #[arg(long, env = "DATABASE_PATH", default_value = "storerate.db")]
    pub database_path: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Access token lifetime in hours
    #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
    pub token_ttl_hours: i64,

    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    pub bcrypt_cost: u32,

    /// Bootstrap admin account, created at startup if the email is unused
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[arg(long, env = "ADMIN_NAME", default_value = "System Administrator Account")]
    pub admin_name: String,
}

/// Credentials for the startup admin account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if self.jwt_secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                "JWT_SECRET is shorter than {} bytes; use a longer random secret in production",
                RECOMMENDED_SECRET_BYTES
            );
        }
        if self.token_ttl_hours <= 0 {
            bail!("TOKEN_TTL_HOURS must be positive");
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            );
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together");
        }
        Ok(())
    }

    pub fn resolved_database_path(&self) -> String {
        resolve_data_path(&self.database_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }

    pub fn bootstrap_admin(&self) -> Option<BootstrapAdmin> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: self.admin_name.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Relative paths are taken relative to the crate directory, not the caller's cwd.
fn resolve_data_path(raw: &str) -> String {
    let p = PathBuf::from(raw);
    if p.is_absolute() || raw == ":memory:" {
        return raw.to_string();
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join(p)
        .to_string_lossy()
        .to_string()
}
