//! Auth service client for registration and login.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::upstream::UpstreamClient;
use crate::Result;

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Client for the auth service.
#[derive(Debug, Clone)]
pub struct AccountsClient {
    upstream: UpstreamClient,
    timeout: Duration,
}

impl AccountsClient {
    pub fn new(upstream: UpstreamClient, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    /// Register a new user.
    pub async fn register(&self, registration: &Registration) -> Result<Value> {
        let request = self.upstream.request(Method::POST, "/register").json(registration);
        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error("Failed to register user"))
    }

    /// Log a user in, returning the auth service's token payload.
    pub async fn login(&self, credentials: &Credentials) -> Result<Value> {
        let request = self.upstream.request(Method::POST, "/login").json(credentials);
        self.upstream.send(request, self.timeout).await.map_err(|e| {
            // Surface the auth service's own reason, e.g. "Invalid credentials"
            let message = match &e {
                crate::upstream::UpstreamFailure::Status { body: Some(body), .. } => body
                    .get("error")
                    .or_else(|| body.get("detail"))
                    .and_then(Value::as_str)
                    .unwrap_or("Failed to login user")
                    .to_string(),
                _ => "Failed to login user".to_string(),
            };
            e.into_error(&message)
        })
    }
}
