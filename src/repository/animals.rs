use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{AnimalRepository, RepoResult};
use crate::database::models::Animal;
use crate::database::DatabaseError;

const SELECT_ANIMAL: &str = r#"
    SELECT a.public_id, a.name, a.species, c.public_id AS cage_public_id, a.date_of_birth
    FROM animals a
    JOIN cages c ON c.id = a.cage_id
"#;

#[derive(Clone)]
pub struct PgAnimalRepository {
    pool: PgPool,
}

impl PgAnimalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lookup_cage_id(conn: &mut PgConnection, cage_public_id: Uuid) -> RepoResult<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM cages WHERE public_id = $1")
        .bind(cage_public_id)
        .fetch_optional(conn)
        .await?;

    row.map(|(id,)| id).ok_or_else(|| DatabaseError::not_found("cage"))
}

#[async_trait]
impl AnimalRepository for PgAnimalRepository {
    async fn create(&self, animal: &Animal) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        let cage_id = lookup_cage_id(&mut tx, animal.cage_public_id).await?;

        sqlx::query(
            r#"
            INSERT INTO animals (public_id, name, species, cage_id, date_of_birth)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(animal.public_id)
        .bind(&animal.name)
        .bind(&animal.species)
        .bind(cage_id)
        .bind(animal.date_of_birth)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<Animal>> {
        let sql = format!("{} ORDER BY a.id", SELECT_ANIMAL);
        let animals = sqlx::query_as::<_, Animal>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(animals)
    }

    async fn find(&self, public_id: Uuid) -> RepoResult<Option<Animal>> {
        let sql = format!("{} WHERE a.public_id = $1", SELECT_ANIMAL);
        let animal = sqlx::query_as::<_, Animal>(&sql)
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(animal)
    }

    async fn update(&self, animal: &Animal) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        let cage_id = lookup_cage_id(&mut tx, animal.cage_public_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE animals
            SET name = $1, species = $2, cage_id = $3, date_of_birth = $4
            WHERE public_id = $5
            "#,
        )
        .bind(&animal.name)
        .bind(&animal.species)
        .bind(cage_id)
        .bind(animal.date_of_birth)
        .bind(animal.public_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("animal"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, public_id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM animals WHERE public_id = $1")
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::on_write(e, "animal already removed"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("animal"));
        }
        Ok(())
    }
}
