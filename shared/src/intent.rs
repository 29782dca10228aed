//! Intent recognition service client.

use std::time::Duration;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::IntentResult;
use crate::upstream::{degrade, UpstreamClient};

/// Client for the intent recognition service. Never fails: an unavailable
/// service yields a `seeking_advice` result.
#[derive(Debug, Clone)]
pub struct IntentClient {
    upstream: UpstreamClient,
    timeout: Duration,
}

impl IntentClient {
    pub fn new(upstream: UpstreamClient, timeout: Duration) -> Self {
        Self { upstream, timeout }
    }

    /// Recognize the intent of `text`.
    pub async fn recognize(&self, text: &str) -> IntentResult {
        let request = self
            .upstream
            .request(Method::POST, "/recognize-intent")
            .json(&json!({ "text": text }));

        let result = self
            .upstream
            .send::<IntentResult>(request, self.timeout)
            .await
            .map(|answer| answer.for_text(text));
        let intent = degrade(result, self.upstream.service(), || IntentResult::seeking_advice(text));
        if intent.is_emergency {
            warn!(primary_intent = %intent.primary_intent, "Emergency intent detected");
        } else {
            debug!(primary_intent = %intent.primary_intent, "Intent resolved");
        }
        intent
    }
}
