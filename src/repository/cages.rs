use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CageRepository, RepoResult};
use crate::database::models::Cage;
use crate::database::DatabaseError;

#[derive(Clone)]
pub struct PgCageRepository {
    pool: PgPool,
}

impl PgCageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CageRepository for PgCageRepository {
    async fn code_exists(&self, code: &str, except: Option<Uuid>) -> RepoResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM cages WHERE code = $1 AND ($2::uuid IS NULL OR public_id <> $2))",
        )
        .bind(code)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(&self, cage: &Cage) -> RepoResult<()> {
        sqlx::query("INSERT INTO cages (public_id, code, location) VALUES ($1, $2, $3)")
            .bind(cage.public_id)
            .bind(&cage.code)
            .bind(&cage.location)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::on_write(e, "cage code already exists"))?;

        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Cage>> {
        let cages = sqlx::query_as::<_, Cage>("SELECT public_id, code, location FROM cages ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(cages)
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Cage>> {
        let cage = sqlx::query_as::<_, Cage>(
            "SELECT public_id, code, location FROM cages WHERE public_id = $1",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cage)
    }

    async fn update(&self, cage: &Cage) -> RepoResult<()> {
        let result = sqlx::query("UPDATE cages SET code = $1, location = $2 WHERE public_id = $3")
            .bind(&cage.code)
            .bind(&cage.location)
            .bind(cage.public_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::on_write(e, "cage code already exists"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("cage"));
        }
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM cages WHERE public_id = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::on_write(e, "cage already removed"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("cage"));
        }
        Ok(())
    }
}
