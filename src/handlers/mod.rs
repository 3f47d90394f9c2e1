// handlers/mod.rs - HTTP handlers, one module per resource
//
// Public:  /health, /auth/login
// JWT:     /api/me, /api/tasks (list, status)
// Manager: /api/managers, /api/zookeepers, /api/cages, /api/animals, task create/delete

pub mod animals;
pub mod auth;
pub mod cages;
pub mod health;
pub mod managers;
pub mod tasks;
pub mod zookeepers;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a public id path segment. Malformed ids cannot match any row, so
/// they report the same 404 as a missing one.
pub(crate) fn parse_public_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", entity)))
}

/// Body of a successful update
#[derive(Debug, serde::Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn updated(entity: &str) -> Self {
        Self {
            message: format!("{} updated successfully", entity),
        }
    }
}
