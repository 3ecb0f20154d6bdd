//! Role Gate

use crate::auth::middleware::{extract_principal, AuthError};
use crate::auth::models::UserRole;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Fixed allow-list for a group of endpoints
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [UserRole],
}

impl RoleGate {
    pub const ADMIN: RoleGate = RoleGate::new(&[UserRole::Admin]);
    pub const STORE_OWNER: RoleGate = RoleGate::new(&[UserRole::StoreOwner]);

    pub const fn new(allowed: &'static [UserRole]) -> Self {
        Self { allowed }
    }

    pub fn check(&self, role: UserRole) -> Result<(), AuthError> {
        authorize(role, self.allowed)
    }
}

/// Pure check of a role against an allow-list
pub fn authorize(role: UserRole, allowed: &[UserRole]) -> Result<(), AuthError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Route layer enforcing a `RoleGate`. Must sit inside `auth_middleware`.
pub async fn role_gate(
    State(gate): State<RoleGate>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = extract_principal(&req).ok_or(AuthError::MissingToken)?;

    if let Err(e) = gate.check(principal.role) {
        warn!(
            user_id = principal.id,
            role = %principal.role,
            path = %req.uri().path(),
            "Role not permitted"
        );
        return Err(e);
    }

    Ok(next.run(req).await)
}
