use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_public_id, Message};
use crate::database::models::Animal;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::AnimalInput;
use crate::types::parse_date;

#[derive(Debug, Deserialize)]
pub struct AnimalRequest {
    pub name: String,
    pub species: String,
    pub cage_public_id: Uuid,
    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,
}

impl TryFrom<AnimalRequest> for AnimalInput {
    type Error = ApiError;

    fn try_from(body: AnimalRequest) -> Result<Self, Self::Error> {
        Ok(AnimalInput {
            date_of_birth: parse_date(body.date_of_birth.as_deref())?,
            name: body.name,
            species: body.species,
            cage_public_id: body.cage_public_id,
        })
    }
}

/// POST /api/animals
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AnimalRequest>, JsonRejection>,
) -> ApiResult<Animal> {
    let Json(body) = payload?;
    let animal = state.animals.create(AnimalInput::try_from(body)?).await?;
    Ok(ApiResponse::created(animal))
}

/// GET /api/animals
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Animal>> {
    Ok(ApiResponse::success(state.animals.list().await?))
}

/// GET /api/animals/:public_id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Animal> {
    let public_id = parse_public_id(&raw_id, "animal")?;
    Ok(ApiResponse::success(state.animals.find(public_id).await?))
}

/// PUT /api/animals/:public_id
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<AnimalRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let public_id = parse_public_id(&raw_id, "animal")?;
    let Json(body) = payload?;

    state.animals.update(public_id, AnimalInput::try_from(body)?).await?;
    Ok(ApiResponse::success(Message::updated("animal")))
}

/// DELETE /api/animals/:public_id
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let public_id = parse_public_id(&raw_id, "animal")?;

    state.animals.delete(public_id).await?;
    Ok(ApiResponse::no_content())
}
