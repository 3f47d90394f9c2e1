use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::Deserialize;

use super::{parse_public_id, Message};
use crate::database::models::Zookeeper;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateZookeeperRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateZookeeperRequest {
    pub name: String,
}

/// POST /api/zookeepers - Create a zookeeper managed by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateZookeeperRequest>, JsonRejection>,
) -> ApiResult<Zookeeper> {
    let Json(body) = payload?;
    tracing::info!(username = %body.username, manager = %auth_user.public_id, "create zookeeper request");

    let zookeeper = state
        .zookeepers
        .create(auth_user.public_id, &body.username, &body.password, &body.name)
        .await?;
    Ok(ApiResponse::created(zookeeper))
}

/// GET /api/zookeepers - List all zookeepers with their manager
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Zookeeper>> {
    Ok(ApiResponse::success(state.zookeepers.list().await?))
}

/// GET /api/zookeepers/:public_id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Zookeeper> {
    let public_id = parse_public_id(&raw_id, "zookeeper")?;
    Ok(ApiResponse::success(state.zookeepers.find(public_id).await?))
}

/// PUT /api/zookeepers/:public_id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateZookeeperRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let public_id = parse_public_id(&raw_id, "zookeeper")?;
    let Json(body) = payload?;

    state.zookeepers.update(public_id, &body.name).await?;
    Ok(ApiResponse::success(Message::updated("zookeeper")))
}

/// DELETE /api/zookeepers/:public_id - Removes profile and user together
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let public_id = parse_public_id(&raw_id, "zookeeper")?;

    state.zookeepers.delete(public_id).await?;
    Ok(ApiResponse::no_content())
}
