use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database;

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Apply all pending migrations")]
    Up,

    #[command(about = "Revert the most recent migration")]
    Down,
}

pub async fn handle(
    cmd: MigrateCommands,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let pool = database::connect(config)
        .await
        .context("failed to connect to database")?;

    match cmd {
        MigrateCommands::Up => {
            database::migrate_up(&pool).await.context("migrate up failed")?;

            match output_format {
                OutputFormat::Json => println!("{}", json!({"migrated": "up"})),
                OutputFormat::Text => println!("Migrations applied"),
            }
        }
        MigrateCommands::Down => {
            let reverted = database::migrate_down(&pool)
                .await
                .context("migrate down failed")?;

            match (output_format, reverted) {
                (OutputFormat::Json, version) => {
                    println!("{}", json!({"migrated": "down", "version": version}))
                }
                (OutputFormat::Text, Some(version)) => println!("Reverted migration {}", version),
                (OutputFormat::Text, None) => println!("No migrations to revert"),
            }
        }
    }

    pool.close().await;
    Ok(())
}
