//! Public registration and login, proxied to the auth service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use shared::http::{parse_json_body, require};
use shared::{Credentials, Registration, Result};
use tracing::info;
use validator::Validate;

use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let request: RegisterRequest = parse_json_body(&body)?;
    require(&request, "Name, email, and password are required")?;

    let registration = Registration {
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
    };
    let result = state.accounts.register(&registration).await?;
    info!("Registered new user");

    Ok((StatusCode::CREATED, Json(result)))
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let request: LoginRequest = parse_json_body(&body)?;
    require(&request, "Email and password are required")?;

    let credentials = Credentials {
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
    };
    Ok(Json(state.accounts.login(&credentials).await?))
}
