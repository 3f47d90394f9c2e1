use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{hash_password, required, ServiceError, ServiceResult};
use crate::database::models::Zookeeper;
use crate::repository::{NewAccount, ZookeeperRepository};
use crate::types::new_public_id;

pub struct ZookeeperService {
    repo: Arc<dyn ZookeeperRepository>,
    bcrypt_cost: u32,
}

impl ZookeeperService {
    pub fn new(repo: Arc<dyn ZookeeperRepository>, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// Create a zookeeper account managed by `manager_public_id`
    pub async fn create(
        &self,
        manager_public_id: Uuid,
        username: &str,
        password: &str,
        name: &str,
    ) -> ServiceResult<Zookeeper> {
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

        let zookeeper = self.repo.create(account, manager_public_id).await?;
        info!(
            public_id = %zookeeper.public_id,
            manager = %manager_public_id,
            "zookeeper created"
        );
        Ok(zookeeper)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Zookeeper>> {
        Ok(self.repo.list().await?)
    }

    pub async fn find(&self, public_id: Uuid) -> ServiceResult<Zookeeper> {
        self.repo
            .find(public_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("zookeeper not found".to_string()))
    }

    pub async fn update(&self, public_id: Uuid, name: &str) -> ServiceResult<()> {
        let name = required("name", name)?;
        self.repo.update_name(public_id, &name).await?;
        info!(public_id = %public_id, "zookeeper updated");
        Ok(())
    }

    pub async fn delete(&self, public_id: Uuid) -> ServiceResult<()> {
        self.repo.delete(public_id).await?;
        info!(public_id = %public_id, "zookeeper deleted");
        Ok(())
    }
}
