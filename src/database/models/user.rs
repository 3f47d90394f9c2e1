use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Role;

/// Login identity row. The internal id never leaves the database layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    #[serde(skip)]
    pub id: i64,
    pub public_id: Uuid,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}
