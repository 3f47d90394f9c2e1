use axum::response::Json;
use serde_json::{json, Value};

/// GET /health - Static liveness check, no database round trip
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
