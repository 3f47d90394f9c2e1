use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{users, NewAccount, RepoResult, ZookeeperRepository};
use crate::database::models::Zookeeper;
use crate::database::DatabaseError;

const SELECT_ZOOKEEPER: &str = r#"
    SELECT
        u.public_id,
        u.username,
        z.name,
        mu.public_id AS manager_public_id,
        m.name AS manager_name
    FROM users u
    JOIN zookeepers z ON z.user_id = u.id
    JOIN users mu ON mu.id = z.manager_id
    JOIN zookeeper_managers m ON m.user_id = mu.id
    WHERE u.role = 'ZOOKEEPER'
"#;

#[derive(Clone)]
pub struct PgZookeeperRepository {
    pool: PgPool,
}

impl PgZookeeperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ZookeeperRepository for PgZookeeperRepository {
    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        users::username_exists(&self.pool, username).await
    }

    async fn create(&self, account: NewAccount, manager_public_id: Uuid) -> RepoResult<Zookeeper> {
        let mut tx = self.pool.begin().await?;

        let manager: Option<(i64, String)> = sqlx::query_as(
            r#"
            SELECT u.id, m.name
            FROM users u
            JOIN zookeeper_managers m ON m.user_id = u.id
            WHERE u.public_id = $1 AND u.role = 'MANAGER'
            "#,
        )
        .bind(manager_public_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (manager_id, manager_name) = manager.ok_or_else(|| DatabaseError::not_found("manager"))?;

        let (user_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (public_id, username, password_hash, role)
            VALUES ($1, $2, $3, 'ZOOKEEPER')
            RETURNING id
            "#,
        )
        .bind(account.public_id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::on_write(e, "username already exists"))?;

        sqlx::query(
            "INSERT INTO zookeepers (public_id, user_id, manager_id, name) VALUES ($1, $2, $3, $4)",
        )
        .bind(account.public_id)
        .bind(user_id)
        .bind(manager_id)
        .bind(&account.name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Zookeeper {
            public_id: account.public_id,
            username: account.username,
            name: account.name,
            manager_public_id,
            manager_name,
        })
    }

    async fn list(&self) -> RepoResult<Vec<Zookeeper>> {
        let sql = format!("{} ORDER BY z.id", SELECT_ZOOKEEPER);
        let zookeepers = sqlx::query_as::<_, Zookeeper>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(zookeepers)
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Zookeeper>> {
        let sql = format!("{} AND u.public_id = $1", SELECT_ZOOKEEPER);
        let zookeeper = sqlx::query_as::<_, Zookeeper>(&sql)
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(zookeeper)
    }

    async fn update_name(&self, public_id: Uuid, name: &str) -> RepoResult<()> {
        let result = sqlx::query("UPDATE zookeepers SET name = $1 WHERE public_id = $2")
            .bind(name)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("zookeeper"));
        }
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM users WHERE public_id = $1 AND role = 'ZOOKEEPER'")
                .bind(public_id)
                .fetch_optional(&mut *tx)
                .await?;
        let (user_id,) = user_id.ok_or_else(|| DatabaseError::not_found("zookeeper"))?;

        sqlx::query("DELETE FROM zookeepers WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::on_write(e, "zookeeper already removed"))?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::on_write(e, "zookeeper already removed"))?;

        tx.commit().await?;
        Ok(())
    }
}
