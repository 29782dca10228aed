//! Emotion tracking service client.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::upstream::UpstreamClient;
use crate::Result;

/// Emotion record sent to the emotion service.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmotion {
    pub emotion: String,
    pub intensity: Value,
    pub notes: Option<String>,
}

/// Client for the emotion tracking service.
#[derive(Debug, Clone)]
pub struct EmotionClient {
    upstream: UpstreamClient,
    timeout: Duration,
}

impl EmotionClient {
    pub fn new(upstream: UpstreamClient, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    async fn get(&self, path: &str, params: &[(&str, String)], message: &str) -> Result<Value> {
        let request = self.upstream.request(Method::GET, path).query(params);
        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error(message))
    }

    /// Record an emotion for `user_id`.
    pub async fn create(&self, user_id: &str, emotion: &NewEmotion) -> Result<Value> {
        let request = self
            .upstream
            .request(Method::POST, "/emotions")
            .query(&[("user_id", user_id)])
            .json(emotion);
        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error("Failed to create emotion entry"))
    }

    /// List a user's most recent emotions.
    pub async fn list(&self, user_id: &str, limit: u32) -> Result<Value> {
        self.get(
            "/emotions",
            &[("user_id", user_id.to_string()), ("limit", limit.to_string())],
            "Failed to get emotion entries",
        )
        .await
    }

    /// Aggregate statistics over the last `days` days.
    pub async fn stats(&self, user_id: &str, days: u32) -> Result<Value> {
        self.get(
            "/emotions/stats",
            &[("user_id", user_id.to_string()), ("days", days.to_string())],
            "Failed to get emotion statistics",
        )
        .await
    }

    /// Emotions of one type.
    pub async fn by_type(&self, user_id: &str, emotion_type: &str) -> Result<Value> {
        self.get(
            "/emotions/by-type",
            &[
                ("user_id", user_id.to_string()),
                ("emotion_type", emotion_type.to_string()),
            ],
            "Failed to get emotions by type",
        )
        .await
    }
}
