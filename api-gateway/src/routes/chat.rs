//! Chat routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::http::{parse_json_body, positive_or, require};
use shared::{ChatReply, ChatRequest, Claims, Result};
use validator::Validate;

use crate::extract::Query;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ResourceParams {
    #[validate(required, length(min = 1))]
    pub query: Option<String>,
    pub limit: Option<String>,
}

/// POST /api/chat/message
pub async fn send_message(
    State(state): State<AppState>,
    Extension(caller): Extension<Claims>,
    body: Bytes,
) -> Result<Json<ChatReply>> {
    let request: ChatRequest = parse_json_body(&body)?;
    Ok(Json(state.chat.handle(request, &caller).await?))
}

/// GET /api/chat/resources?query&limit
pub async fn resources(
    State(state): State<AppState>,
    Query(params): Query<ResourceParams>,
) -> Result<Json<Value>> {
    require(&params, "Query parameter is required")?;
    let query = params.query.as_deref().unwrap_or_default();
    let k = positive_or(params.limit.as_deref(), 5);

    let documents = state.rag.retrieve_documents(query, k).await?;
    Ok(Json(json!({ "resources": documents })))
}

/// GET /api/chat/history
pub async fn history() -> Json<Value> {
    // Conversation history is not stored anywhere yet
    Json(json!({
        "history": [],
        "message": "Chat history is not available yet"
    }))
}
