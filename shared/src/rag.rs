//! RAG/chat service client.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{ChatEnvelope, ChatMessage, IntentResult, RagChatReply, RagChatRequest, SentimentResult};
use crate::upstream::UpstreamClient;
use crate::Result;

/// One user turn handed to the chat service.
#[derive(Debug)]
pub struct ChatTurn<'a> {
    pub message: &'a str,
    pub user_id: &'a str,
    pub conversation_id: Option<&'a str>,
    pub sentiment: &'a SentimentResult,
    pub intent: &'a IntentResult,
}

/// Client for the RAG service: chat generation and document retrieval.
#[derive(Debug, Clone)]
pub struct RagClient {
    upstream: UpstreamClient,
    /// Deadline for document retrieval
    timeout: Duration,
    /// Deadline for chat generation
    generation_timeout: Duration,
    /// Reply used when generation fails
    fallback_message: String,
    /// Send sentiment and intent along with the turn
    forward_analysis: bool,
}

impl RagClient {
    pub fn new(
        upstream: UpstreamClient,
        timeout: Duration,
        generation_timeout: Duration,
        fallback_message: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            timeout,
            generation_timeout,
            fallback_message: fallback_message.into(),
            forward_analysis: false,
        }
    }

    /// Also send the sentiment and intent results to the chat service.
    pub fn with_forward_analysis(mut self, forward: bool) -> Self {
        self.forward_analysis = forward;
        self
    }

    /// Generate a reply for one turn. Never fails: an unavailable service
    /// yields the configured fallback message.
    pub async fn process_chat(&self, turn: ChatTurn<'_>) -> ChatEnvelope {
        let body = RagChatRequest {
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: turn.message.to_string(),
            }],
            user_id: turn.user_id,
            conversation_id: turn.conversation_id,
            include_sources: true,
            sentiment: self.forward_analysis.then_some(turn.sentiment),
            intent: self.forward_analysis.then_some(turn.intent),
        };

        let started = Instant::now();
        let request = self.upstream.request(Method::POST, "/chat").json(&body);
        match self.upstream.send::<RagChatReply>(request, self.generation_timeout).await {
            Ok(reply) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                info!(
                    conversation_id = ?reply.conversation_id,
                    sources = reply.sources.as_ref().map_or(0, Vec::len),
                    "Chat service replied"
                );
                ChatEnvelope::merge(reply, turn.conversation_id, &self.fallback_message, elapsed_ms)
            }
            Err(failure) => {
                warn!(service = self.upstream.service(), error = %failure, "Chat generation failed, using fallback reply");
                ChatEnvelope::fallback(&self.fallback_message, turn.conversation_id)
            }
        }
    }

    /// Retrieve up to `k` documents relevant to `query`.
    pub async fn retrieve_documents(&self, query: &str, k: u32) -> Result<Value> {
        let request = self
            .upstream
            .request(Method::GET, "/retrieve")
            .query(&[("query", query.to_string()), ("k", k.to_string())]);

        self.upstream
            .send(request, self.timeout)
            .await
            .map_err(|e| e.into_error("Failed to retrieve resources"))
    }
}
