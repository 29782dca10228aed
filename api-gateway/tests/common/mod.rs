#![allow(dead_code)]

use std::collections::HashMap;

use api_gateway::{router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use shared::Config;
use tower::ServiceExt;
use wiremock::MockServer;

pub const SECRET: &str = "integration-secret";
pub const FALLBACK: &str = "I'm here to listen and support you. How can I help you today?";

/// Gateway wired to a single mock server standing in for every upstream.
pub struct Harness {
    pub server: MockServer,
    pub app: Router,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    pub async fn start_with(overrides: &[(&str, &str)]) -> Self {
        let server = MockServer::start().await;
        let uri = server.uri();

        let mut vars: HashMap<String, String> = [
            "AUTH_SERVICE_URL",
            "SENTIMENT_SERVICE_URL",
            "INTENT_SERVICE_URL",
            "RAG_SERVICE_URL",
        ]
        .into_iter()
        .map(|key| (key.to_string(), uri.clone()))
        .collect();
        vars.insert("JWT_SECRET".to_string(), SECRET.to_string());
        vars.insert("UPSTREAM_TIMEOUT_MS".to_string(), "300".to_string());
        vars.insert("GENERATION_TIMEOUT_MS".to_string(), "300".to_string());
        for (key, value) in overrides {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let state = AppState::new(&config, SECRET).unwrap();

        Self {
            server,
            app: router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn upstream_calls(&self) -> usize {
        self.server.received_requests().await.unwrap().len()
    }
}

pub fn token_for(user_id: &str) -> String {
    let claims = json!({
        "user_id": user_id,
        "email": format!("{}@example.com", user_id),
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request("DELETE", uri, token, None)
}

pub fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("POST", uri, token, Some(body))
}

pub fn put(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("PUT", uri, token, Some(body))
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
