//! Chat message pipeline: sentiment and intent, then generation.

use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::Claims;
use crate::http::require;
use crate::intent::IntentClient;
use crate::models::ChatReply;
use crate::rag::{ChatTurn, RagClient};
use crate::sentiment::SentimentClient;
use crate::Result;

/// Inbound chat message.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Runs one chat turn across the sentiment, intent and chat services.
#[derive(Debug, Clone)]
pub struct ChatOrchestrator {
    sentiment: SentimentClient,
    intent: IntentClient,
    rag: RagClient,
}

impl ChatOrchestrator {
    pub fn new(sentiment: SentimentClient, intent: IntentClient, rag: RagClient) -> Self {
        Self {
            sentiment,
            intent,
            rag,
        }
    }

    /// Handle one message for an authenticated caller.
    ///
    /// Only a missing message is an error. Each upstream degrades to its
    /// default, so a validated request always gets a reply.
    #[instrument(skip_all, fields(user_id = %caller.user_id))]
    pub async fn handle(&self, request: ChatRequest, caller: &Claims) -> Result<ChatReply> {
        require(&request, "Message is required")?;
        let message = request.message.as_deref().unwrap_or_default();
        let conversation_id = request.conversation_id.as_deref().filter(|id| !id.is_empty());

        info!(
            conversation_id = conversation_id.unwrap_or("new"),
            chars = message.chars().count(),
            "Processing chat message"
        );

        // Independent analyses; generation waits for both
        let (sentiment, intent) = tokio::join!(
            self.sentiment.analyze(message),
            self.intent.recognize(message)
        );

        let envelope = self
            .rag
            .process_chat(ChatTurn {
                message,
                user_id: &caller.user_id,
                conversation_id,
                sentiment: &sentiment,
                intent: &intent,
            })
            .await;

        Ok(ChatReply {
            envelope,
            sentiment,
            intent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use crate::Error;
    use crate::upstream::UpstreamClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FALLBACK: &str = "I'm here for you.";

    fn orchestrator(server: &MockServer, forward: bool) -> ChatOrchestrator {
        let http = reqwest::Client::new();
        let timeout = Duration::from_millis(200);
        ChatOrchestrator::new(
            SentimentClient::new(UpstreamClient::new(http.clone(), "sentiment", server.uri()), timeout),
            IntentClient::new(UpstreamClient::new(http.clone(), "intent", server.uri()), timeout),
            RagClient::new(
                UpstreamClient::new(http, "rag", server.uri()),
                timeout,
                timeout,
                FALLBACK,
            )
            .with_forward_analysis(forward),
        )
    }

    fn caller() -> Claims {
        Claims {
            user_id: "user-7".to_string(),
            email: None,
            expires_at: None,
        }
    }

    fn chat(message: &str, conversation_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            message: Some(message.to_string()),
            conversation_id: conversation_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_calls() {
        let server = MockServer::start().await;
        let orchestrator = orchestrator(&server, false);

        for request in [ChatRequest::default(), chat("", None)] {
            let result = orchestrator.handle(request, &caller()).await;
            assert!(matches!(result, Err(Error::MissingField(_))));
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_upstreams_succeed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-sentiment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "I feel great",
                "sentiment": "positive",
                "scores": {"positive": 0.9, "negative": 0.02, "neutral": 0.08},
                "compound": 0.85
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/recognize-intent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "I feel great",
                "primary_intent": "gratitude",
                "confidence": 0.7,
                "all_intents": {"gratitude": 0.7, "venting": 0.3},
                "is_emergency": false
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({
                "messages": [{"role": "user", "content": "I feel great"}],
                "user_id": "user-7",
                "conversation_id": null,
                "include_sources": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Glad to hear it!",
                "sources": [{"id": "doc-1"}],
                "conversation_id": "conv-9"
            })))
            .mount(&server)
            .await;

        let reply = orchestrator(&server, false)
            .handle(chat("I feel great", None), &caller())
            .await
            .unwrap();

        assert_eq!(reply.sentiment.sentiment, Sentiment::Positive);
        assert_eq!(reply.intent.primary_intent, "gratitude");
        assert_eq!(reply.envelope.response, "Glad to hear it!");
        assert_eq!(reply.envelope.message, "Glad to hear it!");
        assert_eq!(reply.envelope.sources, vec![json!({"id": "doc-1"})]);
        assert_eq!(reply.envelope.conversation_id.as_deref(), Some("conv-9"));
    }

    #[tokio::test]
    async fn test_every_upstream_down_still_answers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let reply = orchestrator(&server, false)
            .handle(chat("help", Some("conv-1")), &caller())
            .await
            .unwrap();

        assert_eq!(reply.sentiment.sentiment, Sentiment::Neutral);
        assert_eq!(reply.sentiment.compound, 0.0);
        assert_eq!(reply.intent.primary_intent, "seeking_advice");
        assert!(!reply.intent.is_emergency);
        assert_eq!(reply.envelope.response, FALLBACK);
        assert_eq!(reply.envelope.message, FALLBACK);
        assert!(reply.envelope.sources.is_empty());
        assert_eq!(reply.envelope.conversation_id.as_deref(), Some("conv-1"));
    }

    #[tokio::test]
    async fn test_forwarded_analysis_reaches_chat_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_partial_json(json!({
                "sentiment": {"sentiment": "neutral"},
                "intent": {"primary_intent": "seeking_advice"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = orchestrator(&server, true)
            .handle(chat("hello", None), &caller())
            .await
            .unwrap();
        assert_eq!(reply.envelope.response, "ok");
    }
}
