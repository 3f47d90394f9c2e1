use std::sync::Arc;

use anyhow::Context;
use axum::{
    handler::Handler,
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{JwtError, JwtKeys};
use crate::config::AppConfig;
use crate::database;
use crate::handlers::{self, animals, cages, managers, tasks, zookeepers};
use crate::middleware::{jwt_auth_middleware, require_manager};
use crate::repository::{
    PgAnimalRepository, PgCageRepository, PgManagerRepository, PgTaskRepository,
    PgUserRepository, PgZookeeperRepository,
};
use crate::services::{
    AnimalService, AuthService, CageService, ManagerService, TaskService, ZookeeperService,
};

/// Shared router state. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub managers: Arc<ManagerService>,
    pub zookeepers: Arc<ZookeeperService>,
    pub cages: Arc<CageService>,
    pub animals: Arc<AnimalService>,
    pub tasks: Arc<TaskService>,
    pub keys: JwtKeys,
}

impl AppState {
    /// Wire the Postgres repositories into every service
    pub fn from_pool(pool: PgPool, config: &AppConfig) -> Result<Self, JwtError> {
        let security = &config.security;
        let keys = JwtKeys::new(&security.jwt_secret, security.jwt_expiry_secs)?;

        Ok(Self {
            auth: Arc::new(AuthService::new(
                Arc::new(PgUserRepository::new(pool.clone())),
                keys.clone(),
            )),
            managers: Arc::new(ManagerService::new(
                Arc::new(PgManagerRepository::new(pool.clone())),
                security.bcrypt_cost,
            )),
            zookeepers: Arc::new(ZookeeperService::new(
                Arc::new(PgZookeeperRepository::new(pool.clone())),
                security.bcrypt_cost,
            )),
            cages: Arc::new(CageService::new(Arc::new(PgCageRepository::new(pool.clone())))),
            animals: Arc::new(AnimalService::new(Arc::new(PgAnimalRepository::new(pool.clone())))),
            tasks: Arc::new(TaskService::new(Arc::new(PgTaskRepository::new(pool)))),
            keys,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let jwt = middleware::from_fn_with_state(state.clone(), jwt_auth_middleware);

    let api = Router::new()
        .route("/me", get(handlers::auth::me))
        .nest("/managers", manager_routes())
        .nest("/zookeepers", zookeeper_routes())
        .nest("/cages", cage_routes())
        .nest("/animals", animal_routes())
        .nest("/tasks", task_routes())
        .route_layer(jwt);

    Router::new()
        // Public
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login))
        // Protected API
        .nest("/api", api)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(managers::list).post(managers::create))
        .route(
            "/:public_id",
            get(managers::get).put(managers::update).delete(managers::delete),
        )
        .route_layer(middleware::from_fn(require_manager))
}

fn zookeeper_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(zookeepers::list).post(zookeepers::create))
        .route(
            "/:public_id",
            get(zookeepers::get).put(zookeepers::update).delete(zookeepers::delete),
        )
        .route_layer(middleware::from_fn(require_manager))
}

fn cage_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cages::list).post(cages::create))
        .route("/:public_id", get(cages::get).put(cages::update).delete(cages::delete))
        .route_layer(middleware::from_fn(require_manager))
}

fn animal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(animals::list).post(animals::create))
        .route(
            "/:public_id",
            get(animals::get).put(animals::update).delete(animals::delete),
        )
        .route_layer(middleware::from_fn(require_manager))
}

/// Listing and status changes are open to both roles; create and delete are manager only
fn task_routes() -> Router<AppState> {
    let manager_only = middleware::from_fn(require_manager);

    Router::new()
        .route(
            "/",
            get(tasks::list).post(tasks::create.layer(manager_only.clone())),
        )
        .route(
            "/:public_id",
            axum::routing::delete(tasks::delete.layer(manager_only)),
        )
        .route("/:public_id/status", patch(tasks::update_status))
}

/// Connect, build state and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let pool = database::connect(&config)
        .await
        .context("failed to connect to database")?;

    let state = AppState::from_pool(pool, &config).context("invalid JWT configuration")?;
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Zoo park API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
