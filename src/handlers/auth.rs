use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub sub: uuid::Uuid,
    pub role: Role,
}

/// POST /auth/login - Exchange username and password for an access token.
/// The token is returned bare, outside the success envelope.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;

    // Blank credentials go through the same lookup and fail the same way
    tracing::info!(username = %body.username, "login request");
    let access_token = state.auth.login(&body.username, &body.password).await?;

    Ok(Json(LoginResponse { access_token }))
}

/// GET /api/me - Identity carried by the caller's token
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> ApiResult<MeResponse> {
    Ok(ApiResponse::success(MeResponse {
        sub: auth_user.public_id,
        role: auth_user.role,
    }))
}
