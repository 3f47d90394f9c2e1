use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::Deserialize;

use super::{parse_public_id, Message};
use crate::database::models::Manager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateManagerRequest {
    pub username: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateManagerRequest {
    pub name: String,
}

/// POST /api/managers - Create a manager account
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateManagerRequest>, JsonRejection>,
) -> ApiResult<Manager> {
    let Json(body) = payload?;
    tracing::info!(username = %body.username, created_by = %auth_user.public_id, "create manager request");

    let manager = state
        .managers
        .create(&body.username, &body.password, &body.name)
        .await?;
    Ok(ApiResponse::created(manager))
}

/// GET /api/managers - List all managers
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Manager>> {
    Ok(ApiResponse::success(state.managers.list().await?))
}

/// GET /api/managers/:public_id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Manager> {
    let public_id = parse_public_id(&raw_id, "manager")?;
    Ok(ApiResponse::success(state.managers.find(public_id).await?))
}

/// PUT /api/managers/:public_id - Rename a manager
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateManagerRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let public_id = parse_public_id(&raw_id, "manager")?;
    let Json(body) = payload?;

    state.managers.update(public_id, &body.name).await?;
    Ok(ApiResponse::success(Message::updated("manager")))
}

/// DELETE /api/managers/:public_id - Callers cannot delete themselves or the last manager
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let public_id = parse_public_id(&raw_id, "manager")?;

    state.managers.delete(auth_user.public_id, public_id).await?;
    Ok(ApiResponse::no_content())
}
