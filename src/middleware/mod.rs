//! Middleware for observability.
//!
//! Authentication and role gates live in `crate::auth`.

pub mod logging;

pub use logging::request_logging;
