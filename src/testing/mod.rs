//! In-memory repositories and app wiring for unit tests.
//!
//! `MemoryStore` implements every repository trait over one mutex-guarded
//! state, enforcing the same uniqueness and reference rules the Postgres
//! schema does.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::{self, JwtKeys, Role};
use crate::database::models::{Animal, Cage, Manager, TaskStatus, TaskView, User, Zookeeper};
use crate::database::DatabaseError;
use crate::repository::managers::LAST_MANAGER;
use crate::repository::{
    AnimalRepository, CageRepository, ManagerRepository, NewAccount, NewTask, RepoResult,
    TaskRepository, UserRepository, ZookeeperRepository,
};
use crate::server::AppState;
use crate::services::{
    AnimalService, AuthService, CageService, ManagerService, TaskService, ZookeeperService,
};

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
struct UserRow {
    id: i64,
    public_id: Uuid,
    username: String,
    password_hash: String,
    role: Role,
    name: String,
    manager_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct AnimalRow {
    id: i64,
    public_id: Uuid,
    name: String,
    species: String,
    cage_id: i64,
    date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
struct TaskRow {
    public_id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    manager_id: i64,
    zookeeper_id: i64,
    animal_id: Option<i64>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: Vec<UserRow>,
    cages: Vec<(i64, Cage)>,
    animals: Vec<AnimalRow>,
    tasks: Vec<TaskRow>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, public_id: Uuid, role: Role) -> Option<&UserRow> {
        self.users
            .iter()
            .find(|u| u.public_id == public_id && u.role == role)
    }

    fn user_by_id(&self, id: i64) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == id)
    }

    fn insert_account(&mut self, account: NewAccount, role: Role, manager_id: Option<i64>) -> RepoResult<()> {
        if self.users.iter().any(|u| u.username == account.username) {
            return Err(DatabaseError::Conflict("username already exists".to_string()));
        }
        let id = self.next_id();
        self.users.push(UserRow {
            id,
            public_id: account.public_id,
            username: account.username,
            password_hash: account.password_hash,
            role,
            name: account.name,
            manager_id,
        });
        Ok(())
    }

    fn zookeeper_view(&self, row: &UserRow) -> Option<Zookeeper> {
        let manager = self.user_by_id(row.manager_id?)?;
        Some(Zookeeper {
            public_id: row.public_id,
            username: row.username.clone(),
            name: row.name.clone(),
            manager_public_id: manager.public_id,
            manager_name: manager.name.clone(),
        })
    }

    fn animal_view(&self, row: &AnimalRow) -> Option<Animal> {
        let (_, cage) = self.cages.iter().find(|(id, _)| *id == row.cage_id)?;
        Some(Animal {
            public_id: row.public_id,
            name: row.name.clone(),
            species: row.species.clone(),
            cage_public_id: cage.public_id,
            date_of_birth: row.date_of_birth,
        })
    }

    fn task_view(&self, row: &TaskRow) -> TaskView {
        TaskView {
            public_id: row.public_id,
            title: row.title.clone(),
            description: row.description.clone(),
            status: row.status,
            due_date: row.due_date,
            zookeeper: self
                .user_by_id(row.zookeeper_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            animal: row
                .animal_id
                .and_then(|id| self.animals.iter().find(|a| a.id == id))
                .map(|a| a.name.clone()),
        }
    }

    fn delete_account(&mut self, public_id: Uuid, role: Role, what: &str) -> RepoResult<()> {
        let id = self
            .user(public_id, role)
            .map(|u| u.id)
            .ok_or_else(|| DatabaseError::not_found(what))?;

        let referenced = self.users.iter().any(|u| u.manager_id == Some(id))
            || self
                .tasks
                .iter()
                .any(|t| t.manager_id == id || t.zookeeper_id == id);
        if referenced {
            return Err(DatabaseError::Conflict(
                "record is still referenced by other records".to_string(),
            ));
        }

        self.users.retain(|u| u.id != id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store poisoned")
    }

    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| User {
                id: u.id,
                public_id: u.public_id,
                username: u.username.clone(),
                password_hash: u.password_hash.clone(),
                role: u.role,
            }))
    }
}

#[async_trait]
impl ManagerRepository for MemoryStore {
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.lock().users.iter().any(|u| u.username == username))
    }

    async fn create(&self, account: NewAccount) -> RepoResult<Manager> {
        let manager = Manager {
            public_id: account.public_id,
            username: account.username.clone(),
            name: account.name.clone(),
        };
        self.lock().insert_account(account, Role::Manager, None)?;
        Ok(manager)
    }

    async fn list(&self) -> RepoResult<Vec<Manager>> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.role == Role::Manager)
            .map(|u| Manager {
                public_id: u.public_id,
                username: u.username.clone(),
                name: u.name.clone(),
            })
            .collect())
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Manager>> {
        Ok(self.lock().user(public_id, Role::Manager).map(|u| Manager {
            public_id: u.public_id,
            username: u.username.clone(),
            name: u.name.clone(),
        }))
    }

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()> {
        let mut state = self.lock();
        let row = state
            .users
            .iter_mut()
            .find(|u| u.public_id == public_id && u.role == Role::Manager)
            .ok_or_else(|| DatabaseError::not_found("manager"))?;
        row.name = name.to_string();
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        let count = self
            .lock()
            .users
            .iter()
            .filter(|u| u.role == Role::Manager)
            .count();
        Ok(count as i64)
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut state = self.lock();
        if state.users.iter().filter(|u| u.role == Role::Manager).count() <= 1 {
            return Err(DatabaseError::Conflict(LAST_MANAGER.to_string()));
        }
        state.delete_account(public_id, Role::Manager, "manager")
    }
}

#[async_trait]
impl ZookeeperRepository for MemoryStore {
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.lock().users.iter().any(|u| u.username == username))
    }

    async fn create(&self, account: NewAccount, manager_public_id: Uuid) -> RepoResult<Zookeeper> {
        let mut state = self.lock();
        let manager = state
            .user(manager_public_id, Role::Manager)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("manager"))?;

        let zookeeper = Zookeeper {
            public_id: account.public_id,
            username: account.username.clone(),
            name: account.name.clone(),
            manager_public_id,
            manager_name: manager.name,
        };
        state.insert_account(account, Role::Zookeeper, Some(manager.id))?;
        Ok(zookeeper)
    }

    async fn list(&self) -> RepoResult<Vec<Zookeeper>> {
        let state = self.lock();
        Ok(state
            .users
            .iter()
            .filter(|u| u.role == Role::Zookeeper)
            .filter_map(|u| state.zookeeper_view(u))
            .collect())
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Zookeeper>> {
        let state = self.lock();
        Ok(state
            .user(public_id, Role::Zookeeper)
            .and_then(|u| state.zookeeper_view(u)))
    }

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()> {
        let mut state = self.lock();
        let row = state
            .users
            .iter_mut()
            .find(|u| u.public_id == public_id && u.role == Role::Zookeeper)
            .ok_or_else(|| DatabaseError::not_found("zookeeper"))?;
        row.name = name.to_string();
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        self.lock().delete_account(public_id, Role::Zookeeper, "zookeeper")
    }
}

#[async_trait]
impl CageRepository for MemoryStore {
    async fn code_exists(&self, code: &str, except: Option<Uuid>) -> RepoResult<bool> {
        Ok(self
            .lock()
            .cages
            .iter()
            .any(|(_, c)| c.code == code && Some(c.public_id) != except))
    }

    async fn create(&self, cage: &Cage) -> RepoResult<()> {
        let mut state = self.lock();
        if state.cages.iter().any(|(_, c)| c.code == cage.code) {
            return Err(DatabaseError::Conflict("cage code already exists".to_string()));
        }
        let id = state.next_id();
        state.cages.push((id, cage.clone()));
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Cage>> {
        Ok(self.lock().cages.iter().map(|(_, c)| c.clone()).collect())
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Cage>> {
        Ok(self
            .lock()
            .cages
            .iter()
            .find(|(_, c)| c.public_id == public_id)
            .map(|(_, c)| c.clone()))
    }

    async fn update(&self, cage: &Cage) -> RepoResult<()> {
        let mut state = self.lock();
        if state
            .cages
            .iter()
            .any(|(_, c)| c.code == cage.code && c.public_id != cage.public_id)
        {
            return Err(DatabaseError::Conflict("cage code already exists".to_string()));
        }
        let (_, row) = state
            .cages
            .iter_mut()
            .find(|(_, c)| c.public_id == cage.public_id)
            .ok_or_else(|| DatabaseError::not_found("cage"))?;
        *row = cage.clone();
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut state = self.lock();
        let id = state
            .cages
            .iter()
            .find(|(_, c)| c.public_id == public_id)
            .map(|(id, _)| *id)
            .ok_or_else(|| DatabaseError::not_found("cage"))?;
        if state.animals.iter().any(|a| a.cage_id == id) {
            return Err(DatabaseError::Conflict(
                "record is still referenced by other records".to_string(),
            ));
        }
        state.cages.retain(|(cid, _)| *cid != id);
        Ok(())
    }
}

#[async_trait]
impl AnimalRepository for MemoryStore {
    async fn create(&self, animal: &Animal) -> RepoResult<()> {
        let mut state = self.lock();
        let cage_id = state
            .cages
            .iter()
            .find(|(_, c)| c.public_id == animal.cage_public_id)
            .map(|(id, _)| *id)
            .ok_or_else(|| DatabaseError::not_found("cage"))?;
        let id = state.next_id();
        state.animals.push(AnimalRow {
            id,
            public_id: animal.public_id,
            name: animal.name.clone(),
            species: animal.species.clone(),
            cage_id,
            date_of_birth: animal.date_of_birth,
        });
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Animal>> {
        let state = self.lock();
        Ok(state
            .animals
            .iter()
            .filter_map(|a| state.animal_view(a))
            .collect())
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Animal>> {
        let state = self.lock();
        Ok(state
            .animals
            .iter()
            .find(|a| a.public_id == public_id)
            .and_then(|a| state.animal_view(a)))
    }

    async fn update(&self, animal: &Animal) -> RepoResult<()> {
        let mut state = self.lock();
        let cage_id = state
            .cages
            .iter()
            .find(|(_, c)| c.public_id == animal.cage_public_id)
            .map(|(id, _)| *id)
            .ok_or_else(|| DatabaseError::not_found("cage"))?;
        let row = state
            .animals
            .iter_mut()
            .find(|a| a.public_id == animal.public_id)
            .ok_or_else(|| DatabaseError::not_found("animal"))?;
        row.name = animal.name.clone();
        row.species = animal.species.clone();
        row.cage_id = cage_id;
        row.date_of_birth = animal.date_of_birth;
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut state = self.lock();
        let id = state
            .animals
            .iter()
            .find(|a| a.public_id == public_id)
            .map(|a| a.id)
            .ok_or_else(|| DatabaseError::not_found("animal"))?;
        if state.tasks.iter().any(|t| t.animal_id == Some(id)) {
            return Err(DatabaseError::Conflict(
                "record is still referenced by other records".to_string(),
            ));
        }
        state.animals.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create(&self, task: NewTask) -> RepoResult<Uuid> {
        let mut state = self.lock();

        // Resolve everything before writing, mirroring the transaction
        let manager_id = state
            .user(task.manager_public_id, Role::Manager)
            .map(|u| u.id)
            .ok_or_else(|| DatabaseError::not_found("manager"))?;
        let zookeeper_id = state
            .user(task.zookeeper_public_id, Role::Zookeeper)
            .map(|u| u.id)
            .ok_or_else(|| DatabaseError::not_found("zookeeper"))?;
        let animal_id = match task.animal_public_id {
            Some(public_id) => Some(
                state
                    .animals
                    .iter()
                    .find(|a| a.public_id == public_id)
                    .map(|a| a.id)
                    .ok_or_else(|| DatabaseError::not_found("animal"))?,
            ),
            None => None,
        };

        state.tasks.push(TaskRow {
            public_id: task.public_id,
            title: task.title,
            description: task.description,
            status: TaskStatus::Pending,
            due_date: task.due_date,
            manager_id,
            zookeeper_id,
            animal_id,
        });
        Ok(task.public_id)
    }

    async fn list_by_manager(&self, manager_public_id: Uuid) -> RepoResult<Vec<TaskView>> {
        let state = self.lock();
        let Some(manager_id) = state.user(manager_public_id, Role::Manager).map(|u| u.id) else {
            return Ok(Vec::new());
        };
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.manager_id == manager_id)
            .map(|t| state.task_view(t))
            .collect())
    }

    async fn list_by_zookeeper(&self, zookeeper_public_id: Uuid) -> RepoResult<Vec<TaskView>> {
        let state = self.lock();
        let Some(zookeeper_id) = state.user(zookeeper_public_id, Role::Zookeeper).map(|u| u.id) else {
            return Ok(Vec::new());
        };
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.zookeeper_id == zookeeper_id)
            .map(|t| state.task_view(t))
            .collect())
    }

    async fn update_status(
        &self,
        public_id: Uuid,
        status: TaskStatus,
        assignee: Option<Uuid>,
    ) -> RepoResult<()> {
        let mut state = self.lock();
        let assignee_id = match assignee {
            Some(public_id) => Some(state.user(public_id, Role::Zookeeper).map(|u| u.id)),
            None => None,
        };
        let row = state
            .tasks
            .iter_mut()
            .find(|t| {
                t.public_id == public_id
                    && assignee_id.map_or(true, |id| id == Some(t.zookeeper_id))
            })
            .ok_or_else(|| DatabaseError::not_found("task"))?;
        row.status = status;
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut state = self.lock();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.public_id != public_id);
        if state.tasks.len() == before {
            return Err(DatabaseError::not_found("task"));
        }
        Ok(())
    }
}

/// Services and router state wired to one shared `MemoryStore`
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let keys = JwtKeys::new(TEST_SECRET, 3600).expect("test keys");
        let cost = 4 /* bcrypt MIN_COST (private in bcrypt 0.15) */;

        let state = AppState {
            auth: Arc::new(AuthService::new(store.clone(), keys.clone())),
            managers: Arc::new(ManagerService::new(store.clone(), cost)),
            zookeepers: Arc::new(ZookeeperService::new(store.clone(), cost)),
            cages: Arc::new(CageService::new(store.clone())),
            animals: Arc::new(AnimalService::new(store.clone())),
            tasks: Arc::new(TaskService::new(store.clone())),
            keys,
        };

        Self { store, state }
    }

    /// Insert a manager directly, bypassing the service rules
    pub async fn seed_manager(&self, username: &str) -> Manager {
        ManagerRepository::create(self.store.as_ref(), account(username))
            .await
            .expect("seed manager")
    }

    pub async fn seed_zookeeper(&self, username: &str, manager: Uuid) -> Zookeeper {
        ZookeeperRepository::create(self.store.as_ref(), account(username), manager)
            .await
            .expect("seed zookeeper")
    }

    pub fn token_for(&self, subject: Uuid, role: Role) -> String {
        self.state.keys.issue(subject, role).expect("issue token")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn account(username: &str) -> NewAccount {
    NewAccount {
        public_id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: auth::hash_password(TEST_PASSWORD, 4 /* bcrypt MIN_COST (private in bcrypt 0.15) */).expect("hash"),
        name: format!("{} name", username),
    }
}
