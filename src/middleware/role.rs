use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::auth::Role;
use crate::error::ApiError;

/// Fail with 403 unless the caller holds `required`
pub fn require_role(user: &AuthUser, required: Role) -> Result<(), ApiError> {
    match (user.role, required) {
        (Role::Manager, Role::Manager) | (Role::Zookeeper, Role::Zookeeper) => Ok(()),
        (Role::Manager, Role::Zookeeper) | (Role::Zookeeper, Role::Manager) => {
            tracing::warn!(
                public_id = %user.public_id,
                role = %user.role,
                required = %required,
                "role check failed"
            );
            Err(ApiError::forbidden(format!("{} role required", required)))
        }
    }
}

/// Route guard for manager-only endpoints. Must run after `jwt_auth_middleware`.
pub async fn require_manager(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before role validation"))?;

    require_role(user, Role::Manager)?;

    Ok(next.run(request).await)
}
