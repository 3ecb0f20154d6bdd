//! Authentication Module
//! Mission: Bearer-token sessions, role authorization and credential checks

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod validation;

pub use jwt::{JwtHandler, TokenError};
pub use middleware::{auth_middleware, AuthError};
pub use models::{Principal, UserRole};
pub use roles::{role_gate, RoleGate};
