pub mod animal_service;
pub mod auth_service;
pub mod cage_service;
pub mod manager_service;
pub mod task_service;
pub mod zookeeper_service;

pub use animal_service::{AnimalInput, AnimalService};
pub use auth_service::AuthService;
pub use cage_service::CageService;
pub use manager_service::ManagerService;
pub use task_service::{TaskInput, TaskService};
pub use zookeeper_service::ZookeeperService;

use thiserror::Error;

use crate::auth::{self, JwtError};
use crate::database::DatabaseError;

/// Application-layer failures. Lookup misses and rule violations carry the
/// caller-facing message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ServiceError::NotFound(msg),
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Trimmed value of a required text field
pub(crate) fn required(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// bcrypt is CPU bound; keep it off the async workers
pub(crate) async fn hash_password(password: &str, cost: u32) -> ServiceResult<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??;
    Ok(hash)
}
