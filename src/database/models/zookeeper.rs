use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Zookeeper {
    pub public_id: Uuid,
    pub username: String,
    pub name: String,
    pub manager_public_id: Uuid,
    pub manager_name: String,
}
