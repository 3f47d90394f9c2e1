use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::Deserialize;

use super::{parse_public_id, Message};
use crate::database::models::Cage;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CageRequest {
    pub code: String,
    pub location: String,
}

/// POST /api/cages
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CageRequest>, JsonRejection>,
) -> ApiResult<Cage> {
    let Json(body) = payload?;
    let cage = state.cages.create(&body.code, &body.location).await?;
    Ok(ApiResponse::created(cage))
}

/// GET /api/cages
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Cage>> {
    Ok(ApiResponse::success(state.cages.list().await?))
}

/// GET /api/cages/:public_id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Cage> {
    let public_id = parse_public_id(&raw_id, "cage")?;
    Ok(ApiResponse::success(state.cages.find(public_id).await?))
}

/// PUT /api/cages/:public_id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<CageRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let public_id = parse_public_id(&raw_id, "cage")?;
    let Json(body) = payload?;

    state.cages.update(public_id, &body.code, &body.location).await?;
    Ok(ApiResponse::success(Message::updated("cage")))
}

/// DELETE /api/cages/:public_id - Fails while animals are still housed there
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let public_id = parse_public_id(&raw_id, "cage")?;

    state.cages.delete(public_id).await?;
    Ok(ApiResponse::no_content())
}
