use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Build configuration from the process environment. Call `dotenvy::dotenv()`
    /// beforehand to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let db_name = get("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;

        let mut config = Self {
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: db_name,
                max_connections: 10,
                connect_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_secs: 3600,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
        };

        if let Some(v) = get("APP_PORT") {
            config.server.port = parse("APP_PORT", v)?;
        }

        // Database overrides
        if let Some(v) = get("DB_HOST") {
            config.database.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            config.database.port = parse("DB_PORT", v)?;
        }
        if let Some(v) = get("DB_USER") {
            config.database.user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            config.database.password = v;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            config.database.max_connections = parse("DB_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = get("DB_CONNECT_TIMEOUT_SECS") {
            config.database.connect_timeout_secs = parse("DB_CONNECT_TIMEOUT_SECS", v)?;
        }

        // Security overrides
        if let Some(v) = get("JWT_EXPIRY_SECS") {
            config.security.jwt_expiry_secs = parse("JWT_EXPIRY_SECS", v)?;
        }
        if let Some(v) = get("BCRYPT_COST") {
            config.security.bcrypt_cost = parse("BCRYPT_COST", v)?;
        }

        Ok(config)
    }

    /// Connection string for the configured Postgres database
    pub fn database_url(&self) -> String {
        let db = &self.database;
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            db.user, db.password, db.host, db.port, db.name
        )
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
