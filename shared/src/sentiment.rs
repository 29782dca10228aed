//! Sentiment analysis service client.

use std::time::Duration;

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::models::SentimentResult;
use crate::upstream::{degrade, UpstreamClient};

/// Client for the sentiment analysis service. Never fails: an unavailable
/// service yields a neutral result.
#[derive(Debug, Clone)]
pub struct SentimentClient {
    upstream: UpstreamClient,
    timeout: Duration,
}

impl SentimentClient {
    pub fn new(upstream: UpstreamClient, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    /// Analyze the sentiment of `text`.
    pub async fn analyze(&self, text: &str) -> SentimentResult {
        let request = self
            .upstream
            .request(Method::POST, "/analyze-sentiment")
            .json(&json!({ "text": text }));

        let result = self
            .upstream
            .send::<SentimentResult>(request, self.timeout)
            .await
            .map(|answer| answer.for_text(text));
        let sentiment = degrade(result, self.upstream.service(), || SentimentResult::neutral(text));
        debug!(sentiment = ?sentiment.sentiment, compound = sentiment.compound, "Sentiment resolved");
        sentiment
    }
}
