//! Route handlers.

pub mod auth;
pub mod chat;
pub mod emotions;
pub mod journal;

use axum::Json;
use serde_json::{json, Value};
use shared::Error;

/// Liveness check. Does not consult any upstream.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> Error {
    Error::NotFound("Not found".to_string())
}

pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
