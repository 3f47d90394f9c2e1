pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "zoo-park")]
#[command(about = "Zoo park staffing API - server, migrations and seed data")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP API server")]
    Http,

    #[command(about = "Apply or revert schema migrations")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Insert a bootstrap manager and zookeeper")]
    Seed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Http => commands::http::handle(config).await,
        Commands::Migrate { cmd } => commands::migrate::handle(cmd, &config, output_format).await,
        Commands::Seed => commands::seed::handle(&config, output_format).await,
    }
}
