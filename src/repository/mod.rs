//! Persistence ports and their Postgres adapters.
//!
//! Services depend on the traits only; the server wires in the `Pg*`
//! implementations and unit tests wire in in-memory ones.

pub mod animals;
pub mod cages;
pub mod managers;
pub mod tasks;
pub mod users;
pub mod zookeepers;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{Animal, Cage, Manager, TaskStatus, TaskView, User, Zookeeper};
use crate::database::DatabaseError;

pub use animals::PgAnimalRepository;
pub use cages::PgCageRepository;
pub use managers::PgManagerRepository;
pub use tasks::PgTaskRepository;
pub use users::PgUserRepository;
pub use zookeepers::PgZookeeperRepository;

pub type RepoResult<T> = Result<T, DatabaseError>;

/// User row plus profile row for a new manager or zookeeper
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub public_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub public_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub manager_public_id: Uuid,
    pub zookeeper_public_id: Uuid,
    pub animal_public_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

#[async_trait]
pub trait ManagerRepository: Send + Sync {
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Inserts the user and profile rows in one transaction
    async fn create(&self, account: NewAccount) -> RepoResult<Manager>;

    async fn list(&self) -> RepoResult<Vec<Manager>>;

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Manager>>;

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()>;

    async fn count(&self) -> RepoResult<i64>;

    /// Removes the profile and user rows in one transaction. Fails with
    /// `Conflict` when the target is the only manager left; the check and
    /// the delete happen under the same lock.
    async fn delete(&self, public_id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait ZookeeperRepository: Send + Sync {
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Resolves the manager and inserts the user and profile rows in one transaction
    async fn create(&self, account: NewAccount, manager_public_id: Uuid) -> RepoResult<Zookeeper>;

    async fn list(&self) -> RepoResult<Vec<Zookeeper>>;

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Zookeeper>>;

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()>;

    async fn delete(&self, public_id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait CageRepository: Send + Sync {
    /// True when another cage (other than `except`) already uses `code`
    async fn code_exists(&self, code: &str, except: Option<Uuid>) -> RepoResult<bool>;

    async fn create(&self, cage: &Cage) -> RepoResult<()>;

    async fn list(&self) -> RepoResult<Vec<Cage>>;

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Cage>>;

    async fn update(&self, cage: &Cage) -> RepoResult<()>;

    async fn delete(&self, public_id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// Fails with `NotFound` when the referenced cage does not exist
    async fn create(&self, animal: &Animal) -> RepoResult<()>;

    async fn list(&self) -> RepoResult<Vec<Animal>>;

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Animal>>;

    async fn update(&self, animal: &Animal) -> RepoResult<()>;

    async fn delete(&self, public_id: Uuid) -> RepoResult<()>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Resolves every reference and inserts inside one transaction
    async fn create(&self, task: NewTask) -> RepoResult<Uuid>;

    async fn list_by_manager(&self, manager_public_id: Uuid) -> RepoResult<Vec<TaskView>>;

    async fn list_by_zookeeper(&self, zookeeper_public_id: Uuid) -> RepoResult<Vec<TaskView>>;

    /// With `assignee` set, only a task assigned to that zookeeper matches
    async fn update_status(
        &self,
        public_id: Uuid,
        status: TaskStatus,
        assignee: Option<Uuid>,
    ) -> RepoResult<()>;

    async fn delete(&self, public_id: Uuid) -> RepoResult<()>;
}
