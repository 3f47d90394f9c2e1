use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{hash_password, required, ServiceError, ServiceResult};
use crate::database::models::Manager;
use crate::repository::{ManagerRepository, NewAccount};
use crate::types::new_public_id;

pub struct ManagerService {
    repo: Arc<dyn ManagerRepository>,
    bcrypt_cost: u32,
}

impl ManagerService {
    pub fn new(repo: Arc<dyn ManagerRepository>, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn create(&self, username: &str, password: &str, name: &str) -> ServiceResult<Manager> {
        let username = required("username", username)?;
        let name = required("name", name)?;
        if password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }

        if self.repo.username_exists(&username).await? {
            return Err(ServiceError::Conflict("username already exists".to_string()));
        }

        let account = NewAccount {
            public_id: new_public_id(),
            username,
            password_hash: hash_password(password, self.bcrypt_cost).await?,
            name,
        };

        let manager = self.repo.create(account).await?;
        info!(public_id = %manager.public_id, username = %manager.username, "manager created");
        Ok(manager)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Manager>> {
        Ok(self.repo.list().await?)
    }

    pub async fn find(&self, public_id: Uuid) -> ServiceResult<Manager> {
        self.repo
            .find(public_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("manager not found".to_string()))
    }

    pub async fn update(&self, public_id: Uuid, name: &str) -> ServiceResult<()> {
        let name = required("name", name)?;
        self.repo.update_name(public_id, &name).await?;
        info!(public_id = %public_id, "manager updated");
        Ok(())
    }

    /// Remove a manager. A manager cannot remove itself; the repository
    /// refuses to remove the last remaining one.
    pub async fn delete(&self, caller: Uuid, public_id: Uuid) -> ServiceResult<()> {
        if caller == public_id {
            return Err(ServiceError::Conflict("cannot delete yourself".to_string()));
        }

        self.repo.delete(public_id).await?;
        info!(public_id = %public_id, deleted_by = %caller, "manager deleted");
        Ok(())
    }
}
