use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::Role;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{self, DatabaseError};
use crate::services;
use crate::types::new_public_id;

const SEED_TIMEOUT: Duration = Duration::from_secs(5);
const SEED_PASSWORD: &str = "password123";

const MANAGER_USERNAME: &str = "manager1";
const MANAGER_NAME: &str = "Main Manager";
const ZOOKEEPER_USERNAME: &str = "zookeeper1";
const ZOOKEEPER_NAME: &str = "Zookeeper One";

/// Insert `manager1` and `zookeeper1` (managed by `manager1`) in one transaction
pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = database::connect(config)
        .await
        .context("failed to connect to database")?;

    let password_hash = services::hash_password(SEED_PASSWORD, config.security.bcrypt_cost)
        .await
        .context("failed to hash seed password")?;

    let seeding = async {
        let mut tx = pool.begin().await?;

        let manager_public_id = new_public_id();
        let manager_id = insert_user(
            &mut tx,
            manager_public_id,
            MANAGER_USERNAME,
            &password_hash,
            Role::Manager,
        )
        .await?;
        sqlx::query("INSERT INTO zookeeper_managers (public_id, user_id, name) VALUES ($1, $2, $3)")
            .bind(manager_public_id)
            .bind(manager_id)
            .bind(MANAGER_NAME)
            .execute(&mut *tx)
            .await?;

        let zookeeper_public_id = new_public_id();
        let zookeeper_id = insert_user(
            &mut tx,
            zookeeper_public_id,
            ZOOKEEPER_USERNAME,
            &password_hash,
            Role::Zookeeper,
        )
        .await?;
        sqlx::query(
            "INSERT INTO zookeepers (public_id, user_id, manager_id, name) VALUES ($1, $2, $3, $4)",
        )
        .bind(zookeeper_public_id)
        .bind(zookeeper_id)
        .bind(manager_id)
        .bind(ZOOKEEPER_NAME)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok::<_, DatabaseError>((manager_public_id, zookeeper_public_id))
    };

    let (manager, zookeeper) = tokio::time::timeout(SEED_TIMEOUT, seeding)
        .await
        .context("seeding timed out")?
        .context("seeding failed")?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "manager": {"public_id": manager, "username": MANAGER_USERNAME},
                "zookeeper": {"public_id": zookeeper, "username": ZOOKEEPER_USERNAME},
            })
        ),
        OutputFormat::Text => {
            println!("Seeded manager {} ({})", MANAGER_USERNAME, manager);
            println!("Seeded zookeeper {} ({})", ZOOKEEPER_USERNAME, zookeeper);
        }
    }

    pool.close().await;
    Ok(())
}

/// Returns the internal id. The user and its profile row share one public id.
async fn insert_user(
    conn: &mut PgConnection,
    public_id: Uuid,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<i64, DatabaseError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (public_id, username, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(public_id)
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(conn)
    .await
    .map_err(|e| DatabaseError::on_write(e, "username already exists"))?;

    Ok(id)
}
