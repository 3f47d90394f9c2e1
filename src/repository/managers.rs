use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{users, ManagerRepository, NewAccount, RepoResult};
use crate::database::models::Manager;
use crate::database::DatabaseError;

pub(crate) const LAST_MANAGER: &str = "at least one manager must exist";

#[derive(Clone)]
pub struct PgManagerRepository {
    pool: PgPool,
}

impl PgManagerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ManagerRepository for PgManagerRepository {
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        users::username_exists(&self.pool, username).await
    }

    async fn create(&self, account: NewAccount) -> RepoResult<Manager> {
        let mut tx = self.pool.begin().await?;

        let (user_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (public_id, username, password_hash, role)
            VALUES ($1, $2, $3, 'MANAGER')
            RETURNING id
            "#,
        )
        .bind(account.public_id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::on_write(e, "username already exists"))?;

        sqlx::query("INSERT INTO zookeeper_managers (public_id, user_id, name) VALUES ($1, $2, $3)")
            .bind(account.public_id)
            .bind(user_id)
            .bind(&account.name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Manager {
            public_id: account.public_id,
            username: account.username,
            name: account.name,
        })
    }

    async fn list(&self) -> RepoResult<Vec<Manager>> {
        let managers = sqlx::query_as::<_, Manager>(
            r#"
            SELECT u.public_id, u.username, m.name
            FROM users u
            JOIN zookeeper_managers m ON m.user_id = u.id
            WHERE u.role = 'MANAGER'
            ORDER BY m.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(managers)
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Manager>> {
        let manager = sqlx::query_as::<_, Manager>(
            r#"
            SELECT u.public_id, u.username, m.name
            FROM users u
            JOIN zookeeper_managers m ON m.user_id = u.id
            WHERE u.public_id = $1 AND u.role = 'MANAGER'
            "#,
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(manager)
    }

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()> {
        let result = sqlx::query("UPDATE zookeeper_managers SET name = $1 WHERE public_id = $2")
            .bind(name)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("manager"));
        }
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'MANAGER'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        // Lock every manager row so concurrent deletes serialize on the
        // count below. Rows removed by a transaction we waited on are skipped.
        let managers: Vec<(i64, Uuid)> = sqlx::query_as(
            "SELECT id, public_id FROM users WHERE role = 'MANAGER' ORDER BY id FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        if managers.len() <= 1 {
            return Err(DatabaseError::Conflict(LAST_MANAGER.to_string()));
        }

        let (user_id, _) = managers
            .into_iter()
            .find(|(_, id)| *id == public_id)
            .ok_or_else(|| DatabaseError::not_found("manager"))?;

        // Profile first, then the identity row
        sqlx::query("DELETE FROM zookeeper_managers WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::on_write(e, "manager already removed"))?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::on_write(e, "manager already removed"))?;

        tx.commit().await?;
        Ok(())
    }
}
