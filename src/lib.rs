//! StoreRate Backend Library
//!
//! Store rating service: accounts, stores, and one rating per user per store.
//! Exposes the router and state so the binary and integration tests share them.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod ratings;
pub mod state;

pub use api::create_router;
pub use state::AppState;
