use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::{required, ServiceError, ServiceResult};
use crate::database::models::Animal;
use crate::repository::AnimalRepository;
use crate::types::new_public_id;

/// Mutable animal fields, shared by create and update
#[derive(Debug, Clone)]
pub struct AnimalInput {
    pub name: String,
    pub species: String,
    pub cage_public_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
}

pub struct AnimalService {
    repo: Arc<dyn AnimalRepository>,
}

impl AnimalService {
    pub fn new(repo: Arc<dyn AnimalRepository>) -> Self {
        Self { repo }
    }

    fn build(public_id: Uuid, input: AnimalInput) -> ServiceResult<Animal> {
        Ok(Animal {
            public_id,
            name: required("name", &input.name)?,
            species: required("species", &input.species)?,
            cage_public_id: input.cage_public_id,
            date_of_birth: input.date_of_birth,
        })
    }

    pub async fn create(&self, input: AnimalInput) -> ServiceResult<Animal> {
        let animal = Self::build(new_public_id(), input)?;
        self.repo.create(&animal).await?;
        info!(public_id = %animal.public_id, cage = %animal.cage_public_id, "animal created");
        Ok(animal)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Animal>> {
        Ok(self.repo.list().await?)
    }

    pub async fn find(&self, public_id: Uuid) -> ServiceResult<Animal> {
        self.repo
            .find(public_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("animal not found".to_string()))
    }

    pub async fn update(&self, public_id: Uuid, input: AnimalInput) -> ServiceResult<()> {
        let animal = Self::build(public_id, input)?;
        self.repo.update(&animal).await?;
        info!(public_id = %public_id, "animal updated");
        Ok(())
    }

    pub async fn delete(&self, public_id: Uuid) -> ServiceResult<()> {
        self.repo.delete(public_id).await?;
        info!(public_id = %public_id, "animal deleted");
        Ok(())
    }
}
