use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_public_id, Message};
use crate::database::models::{TaskStatus, TaskView};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;
use crate::services::TaskInput;
use crate::types::parse_date;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub zookeeper_public_id: Uuid,
    pub animal_public_id: Option<Uuid>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTask {
    pub public_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// POST /api/tasks - Create a task owned by the calling manager
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<CreatedTask> {
    let Json(body) = payload?;
    let input = TaskInput {
        due_date: parse_date(body.due_date.as_deref())?,
        title: body.title,
        description: body.description,
        zookeeper_public_id: body.zookeeper_public_id,
        animal_public_id: body.animal_public_id,
    };

    let public_id = state.tasks.create(auth_user.public_id, input).await?;
    Ok(ApiResponse::created(CreatedTask { public_id }))
}

/// GET /api/tasks - Tasks created by a manager, or assigned to a zookeeper
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<TaskView>> {
    let tasks = state.tasks.list_for(auth_user.role, auth_user.public_id).await?;
    Ok(ApiResponse::success(tasks))
}

/// PATCH /api/tasks/:public_id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Message> {
    let public_id = parse_public_id(&raw_id, "task")?;
    let Json(body) = payload?;
    let status: TaskStatus = body.status.parse()?;

    state
        .tasks
        .update_status(auth_user.role, auth_user.public_id, public_id, status)
        .await?;
    Ok(ApiResponse::success(Message::updated("task")))
}

/// DELETE /api/tasks/:public_id
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<()> {
    let public_id = parse_public_id(&raw_id, "task")?;

    state.tasks.delete(public_id).await?;
    Ok(ApiResponse::no_content())
}
