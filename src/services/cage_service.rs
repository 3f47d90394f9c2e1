use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{required, ServiceError, ServiceResult};
use crate::database::models::Cage;
use crate::repository::CageRepository;
use crate::types::new_public_id;

pub struct CageService {
    repo: Arc<dyn CageRepository>,
}

impl CageService {
    pub fn new(repo: Arc<dyn CageRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, code: &str, location: &str) -> ServiceResult<Cage> {
        let cage = Cage {
            public_id: new_public_id(),
            code: required("code", code)?,
            location: required("location", location)?,
        };

        if self.repo.code_exists(&cage.code, None).await? {
            return Err(ServiceError::Conflict("cage code already exists".to_string()));
        }

        self.repo.create(&cage).await?;
        info!(public_id = %cage.public_id, code = %cage.code, "cage created");
        Ok(cage)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Cage>> {
        Ok(self.repo.list().await?)
    }

    pub async fn find(&self, public_id: Uuid) -> ServiceResult<Cage> {
        self.repo
            .find(public_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("cage not found".to_string()))
    }

    /// A cage may keep its own code; any other cage's code is a conflict
    pub async fn update(&self, public_id: Uuid, code: &str, location: &str) -> ServiceResult<()> {
        let cage = Cage {
            public_id,
            code: required("code", code)?,
            location: required("location", location)?,
        };

        if self.repo.code_exists(&cage.code, Some(public_id)).await? {
            return Err(ServiceError::Conflict("cage code already exists".to_string()));
        }

        self.repo.update(&cage).await?;
        info!(public_id = %public_id, "cage updated");
        Ok(())
    }

    pub async fn delete(&self, public_id: Uuid) -> ServiceResult<()> {
        self.repo.delete(public_id).await?;
        info!(public_id = %public_id, "cage deleted");
        Ok(())
    }
}
