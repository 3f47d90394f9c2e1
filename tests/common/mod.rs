#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use zoo_park_api::config::AppConfig;
use zoo_park_api::database;

/// Credentials inserted by `zoo-park seed`
pub const SEED_MANAGER: &str = "manager1";
pub const SEED_ZOOKEEPER: &str = "zookeeper1";
pub const SEED_PASSWORD: &str = "password123";

const BIN: &str = env!("CARGO_BIN_EXE_zoo-park");

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Mutex<Child>,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Schema and bootstrap accounts first. Seeding a database that was
        // already seeded fails on the unique username, which is fine here.
        let status = Command::new(BIN)
            .args(["migrate", "up"])
            .status()
            .context("failed to run migrations")?;
        anyhow::ensure!(status.success(), "migrate up exited with {}", status);
        let _ = Command::new(BIN).arg("seed").stdout(Stdio::null()).status();

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(BIN)
            .arg("http")
            .env("APP_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child: Mutex::new(child),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);

        while Instant::now() < deadline {
            if let Some(status) = self.exited() {
                anyhow::bail!("server exited early with {}", status);
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    fn exited(&self) -> Option<std::process::ExitStatus> {
        let mut child = self.child.lock().ok()?;
        child.try_wait().ok().flatten()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let res = reqwest::Client::new()
            .post(self.url("/auth/login"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response missing access_token")
    }
}

/// Integration tests need a reachable Postgres configured through `.env`
pub fn database_enabled() -> bool {
    matches!(
        std::env::var("ZOO_PARK_TEST_DATABASE").as_deref(),
        Ok("1") | Ok("true")
    )
}

/// Start the shared server, or `None` when the database is not available
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    if !database_enabled() {
        eprintln!("skipping: set ZOO_PARK_TEST_DATABASE=1 to run against a database");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Unique suffix so reruns against the same database do not collide
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

/// A private schema with every migration applied. Tests that assert exact
/// row counts run here instead of against the shared seeded tables.
pub struct IsolatedDb {
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl IsolatedDb {
    /// `None` when the database is not available
    pub async fn create() -> Result<Option<Self>> {
        if !database_enabled() {
            eprintln!("skipping: set ZOO_PARK_TEST_DATABASE=1 to run against a database");
            return Ok(None);
        }
        dotenvy::dotenv().ok();

        let config = AppConfig::from_env()?;
        let admin = database::connect(&config).await?;

        let schema = format!("test_{}", uuid::Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await?;

        let options = PgConnectOptions::from_str(&config.database_url())?
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to connect to isolated schema")?;
        database::migrate_up(&pool).await?;

        Ok(Some(Self { pool, admin, schema }))
    }

    pub async fn cleanup(self) -> Result<()> {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await?;
        Ok(())
    }
}
