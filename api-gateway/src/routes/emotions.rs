//! Emotion tracking routes.
//!
//! These take `user_id` from the request rather than from a token. When the
//! routes sit behind the token gate, a missing `user_id` falls back to the
//! caller's.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value;
use shared::http::{parse_json_body, positive_or, require};
use shared::{Claims, NewEmotion, Result};
use validator::Validate;

use crate::extract::Query;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmotionRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub emotion: Option<String>,
    #[serde(default)]
    #[validate(required)]
    pub intensity: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListParams {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatsParams {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ByTypeParams {
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub emotion_type: Option<String>,
}

fn user_or_caller(user_id: Option<String>, caller: &Option<Extension<Claims>>) -> Option<String> {
    user_id
        .filter(|id| !id.is_empty())
        .or_else(|| caller.as_ref().map(|Extension(claims)| claims.user_id.clone()))
}

/// POST /api/emotions
pub async fn create_emotion(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let mut request: CreateEmotionRequest = parse_json_body(&body)?;
    request.user_id = user_or_caller(request.user_id, &caller);
    require(&request, "Emotion, intensity, and user_id are required")?;

    let emotion = NewEmotion {
        emotion: request.emotion.unwrap_or_default(),
        intensity: request.intensity.unwrap_or_default(),
        notes: request.notes,
    };
    let user_id = request.user_id.unwrap_or_default();
    let created = state.emotions.create(&user_id, &emotion).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/emotions?user_id&limit
pub async fn list_emotions(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    Query(mut params): Query<ListParams>,
) -> Result<Json<Value>> {
    params.user_id = user_or_caller(params.user_id, &caller);
    require(&params, "user_id is required")?;

    let user_id = params.user_id.as_deref().unwrap_or_default();
    let limit = positive_or(params.limit.as_deref(), 100);
    Ok(Json(state.emotions.list(user_id, limit).await?))
}

/// GET /api/emotions/stats?user_id&days
pub async fn emotion_stats(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    Query(mut params): Query<StatsParams>,
) -> Result<Json<Value>> {
    params.user_id = user_or_caller(params.user_id, &caller);
    require(&params, "user_id is required")?;

    let user_id = params.user_id.as_deref().unwrap_or_default();
    let days = positive_or(params.days.as_deref(), 30);
    Ok(Json(state.emotions.stats(user_id, days).await?))
}

/// GET /api/emotions/by-type?user_id&emotion_type
pub async fn emotions_by_type(
    State(state): State<AppState>,
    caller: Option<Extension<Claims>>,
    Query(mut params): Query<ByTypeParams>,
) -> Result<Json<Value>> {
    params.user_id = user_or_caller(params.user_id, &caller);
    require(&params, "user_id and emotion_type are required")?;

    let user_id = params.user_id.as_deref().unwrap_or_default();
    let emotion_type = params.emotion_type.as_deref().unwrap_or_default();
    Ok(Json(state.emotions.by_type(user_id, emotion_type).await?))
}
