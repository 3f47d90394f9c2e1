use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::{required, ServiceResult};
use crate::auth::Role;
use crate::database::models::{TaskStatus, TaskView};
use crate::repository::{NewTask, TaskRepository};
use crate::types::new_public_id;

#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub zookeeper_public_id: Uuid,
    pub animal_public_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Create a task owned by `manager_public_id`. Every reference is
    /// resolved before anything is written.
    pub async fn create(&self, manager_public_id: Uuid, input: TaskInput) -> ServiceResult<Uuid> {
        let task = NewTask {
            public_id: new_public_id(),
            title: required("title", &input.title)?,
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            manager_public_id,
            zookeeper_public_id: input.zookeeper_public_id,
            animal_public_id: input.animal_public_id,
            due_date: input.due_date,
        };

        let public_id = self.repo.create(task).await?;
        info!(
            public_id = %public_id,
            manager = %manager_public_id,
            zookeeper = %input.zookeeper_public_id,
            "task created"
        );
        Ok(public_id)
    }

    pub async fn list_by_manager(&self, manager_public_id: Uuid) -> ServiceResult<Vec<TaskView>> {
        Ok(self.repo.list_by_manager(manager_public_id).await?)
    }

    pub async fn list_by_zookeeper(&self, zookeeper_public_id: Uuid) -> ServiceResult<Vec<TaskView>> {
        Ok(self.repo.list_by_zookeeper(zookeeper_public_id).await?)
    }

    /// Managers see the tasks they created, zookeepers the tasks assigned to them
    pub async fn list_for(&self, role: Role, subject: Uuid) -> ServiceResult<Vec<TaskView>> {
        match role {
            Role::Manager => self.list_by_manager(subject).await,
            Role::Zookeeper => self.list_by_zookeeper(subject).await,
        }
    }

    /// Zookeepers may only move tasks assigned to them; a foreign task
    /// reads as not found.
    pub async fn update_status(
        &self,
        role: Role,
        subject: Uuid,
        public_id: Uuid,
        status: TaskStatus,
    ) -> ServiceResult<()> {
        let assignee = match role {
            Role::Manager => None,
            Role::Zookeeper => Some(subject),
        };

        self.repo.update_status(public_id, status, assignee).await?;
        info!(public_id = %public_id, status = %status, updated_by = %subject, "task status updated");
        Ok(())
    }

    pub async fn delete(&self, public_id: Uuid) -> ServiceResult<()> {
        self.repo.delete(public_id).await?;
        info!(public_id = %public_id, "task deleted");
        Ok(())
    }
}
