use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{NewTask, RepoResult, TaskRepository};
use crate::auth::Role;
use crate::database::models::{TaskStatus, TaskView};
use crate::database::DatabaseError;

const SELECT_TASK: &str = r#"
    SELECT
        t.public_id,
        t.title,
        t.description,
        t.status,
        t.due_date,
        zu.username AS zookeeper,
        a.name AS animal
    FROM tasks t
    JOIN users zu ON zu.id = t.zookeeper_id
    JOIN users mu ON mu.id = t.manager_id
    LEFT JOIN animals a ON a.id = t.animal_id
"#;

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, filter: &str, public_id: Uuid) -> RepoResult<Vec<TaskView>> {
        let sql = format!("{} WHERE {} = $1 ORDER BY t.id", SELECT_TASK, filter);
        let tasks = sqlx::query_as::<_, TaskView>(&sql)
            .bind(public_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }
}

async fn lookup_user_id(conn: &mut PgConnection, public_id: Uuid, role: Role) -> RepoResult<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE public_id = $1 AND role = $2")
        .bind(public_id)
        .bind(role.as_str())
        .fetch_optional(conn)
        .await?;

    let what = match role {
        Role::Manager => "manager",
        Role::Zookeeper => "zookeeper",
    };
    row.map(|(id,)| id).ok_or_else(|| DatabaseError::not_found(what))
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> RepoResult<Uuid> {
        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.pool.begin().await?;

        let manager_id = lookup_user_id(&mut tx, task.manager_public_id, Role::Manager).await?;
        let zookeeper_id = lookup_user_id(&mut tx, task.zookeeper_public_id, Role::Zookeeper).await?;

        let animal_id = match task.animal_public_id {
            Some(animal_public_id) => {
                let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM animals WHERE public_id = $1")
                    .bind(animal_public_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                Some(row.map(|(id,)| id).ok_or_else(|| DatabaseError::not_found("animal"))?)
            }
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO tasks
                (public_id, title, description, status, manager_id, zookeeper_id, animal_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(task.public_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(TaskStatus::Pending.as_str())
        .bind(manager_id)
        .bind(zookeeper_id)
        .bind(animal_id)
        .bind(task.due_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task.public_id)
    }

    async fn list_by_manager(&self, manager_public_id: Uuid) -> RepoResult<Vec<TaskView>> {
        self.list_where("mu.public_id", manager_public_id).await
    }

    async fn list_by_zookeeper(&self, zookeeper_public_id: Uuid) -> RepoResult<Vec<TaskView>> {
        self.list_where("zu.public_id", zookeeper_public_id).await
    }

    async fn update_status(
        &self,
        public_id: Uuid,
        status: TaskStatus,
        assignee: Option<Uuid>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET status = $1
            WHERE public_id = $2
              AND ($3::uuid IS NULL
                   OR zookeeper_id = (SELECT id FROM users WHERE public_id = $3))
            "#,
        )
        .bind(status.as_str())
        .bind(public_id)
        .bind(assignee)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("task"));
        }
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE public_id = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("task"));
        }
        Ok(())
    }
}
