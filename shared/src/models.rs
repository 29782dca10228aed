//! Shared data models.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Overall polarity of a message. Labels outside the usual three are kept
/// as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
    #[serde(untagged)]
    Other(String),
}

/// Per-class sentiment probabilities, summing to roughly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    #[serde(default)]
    pub positive: f64,
    #[serde(default)]
    pub negative: f64,
    #[serde(default)]
    pub neutral: f64,
}

impl Default for SentimentScores {
    fn default() -> Self {
        Self {
            positive: 0.33,
            negative: 0.33,
            neutral: 0.34,
        }
    }
}

/// Result of sentiment analysis.
///
/// Fields the sentiment service leaves out take their neutral defaults;
/// fields it adds are carried through in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub scores: SentimentScores,
    /// Compound score in [-1, 1]
    #[serde(default)]
    pub compound: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SentimentResult {
    /// Neutral result used when the sentiment service is unavailable.
    pub fn neutral(text: &str) -> Self {
        Self {
            text: text.to_string(),
            sentiment: Sentiment::Neutral,
            scores: SentimentScores::default(),
            compound: 0.0,
            extra: Map::new(),
        }
    }

    /// Fill in the analysed text when the service did not echo it.
    pub fn for_text(mut self, text: &str) -> Self {
        if self.text.is_empty() {
            self.text = text.to_string();
        }
        self
    }
}

fn default_intent() -> String {
    "seeking_advice".to_string()
}

/// Result of intent recognition.
///
/// Fields the intent service leaves out take their defaults; fields it adds
/// are carried through in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_intent")]
    pub primary_intent: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub all_intents: BTreeMap<String, f64>,
    #[serde(default)]
    pub is_emergency: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IntentResult {
    /// Result used when the intent service is unavailable.
    pub fn seeking_advice(text: &str) -> Self {
        let all_intents = [
            ("seeking_advice", 0.8),
            ("venting", 0.2),
            ("greeting", 0.0),
            ("farewell", 0.0),
            ("gratitude", 0.0),
            ("emergency", 0.0),
        ]
        .into_iter()
        .map(|(label, score)| (label.to_string(), score))
        .collect();

        Self {
            text: text.to_string(),
            primary_intent: default_intent(),
            confidence: 0.8,
            all_intents,
            is_emergency: false,
            extra: Map::new(),
        }
    }

    /// Fill in the analysed text when the service did not echo it.
    pub fn for_text(mut self, text: &str) -> Self {
        if self.text.is_empty() {
            self.text = text.to_string();
        }
        self
    }
}

/// One message in a chat service conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for the chat service.
#[derive(Debug, Serialize)]
pub struct RagChatRequest<'a> {
    pub messages: Vec<ChatMessage>,
    pub user_id: &'a str,
    pub conversation_id: Option<&'a str>,
    pub include_sources: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<&'a SentimentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<&'a IntentResult>,
}

/// Reply from the chat service. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RagChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Value>>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The gateway's chat response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEnvelope {
    pub response: String,
    /// Same text as `response`
    pub message: String,
    pub sources: Vec<Value>,
    pub conversation_id: Option<String>,
    pub processing_time_ms: f64,
    pub timestamp: String,
}

impl ChatEnvelope {
    /// Merge a chat service reply into the envelope.
    ///
    /// `response` and `message` are cross-filled from whichever the upstream
    /// supplied (preferring `response`); if it supplied neither, `fallback`
    /// fills both. The upstream conversation id wins over the caller's.
    pub fn merge(
        reply: RagChatReply,
        caller_conversation_id: Option<&str>,
        fallback: &str,
        elapsed_ms: f64,
    ) -> Self {
        let text = non_blank(reply.response)
            .or_else(|| non_blank(reply.message))
            .unwrap_or_else(|| fallback.to_string());

        Self {
            message: text.clone(),
            response: text,
            sources: reply.sources.unwrap_or_default(),
            conversation_id: non_blank(reply.conversation_id)
                .or_else(|| caller_conversation_id.map(str::to_string)),
            processing_time_ms: reply.processing_time_ms.unwrap_or(elapsed_ms),
            timestamp: non_blank(reply.timestamp).unwrap_or_else(now_rfc3339),
        }
    }

    /// Envelope used when the chat service failed outright.
    pub fn fallback(fallback: &str, caller_conversation_id: Option<&str>) -> Self {
        Self {
            response: fallback.to_string(),
            message: fallback.to_string(),
            sources: Vec::new(),
            conversation_id: caller_conversation_id.map(str::to_string),
            processing_time_ms: 0.0,
            timestamp: now_rfc3339(),
        }
    }
}

/// Envelope plus the locally computed analysis, as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    #[serde(flatten)]
    pub envelope: ChatEnvelope,
    pub sentiment: SentimentResult,
    pub intent: IntentResult,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FALLBACK: &str = "fallback text";

    fn reply(value: Value) -> RagChatReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_message_only_fills_response() {
        let envelope = ChatEnvelope::merge(reply(json!({"message": "hello"})), None, FALLBACK, 1.0);
        assert_eq!(envelope.response, "hello");
        assert_eq!(envelope.message, "hello");
    }

    #[test]
    fn test_response_only_fills_message() {
        let envelope = ChatEnvelope::merge(reply(json!({"response": "hi"})), None, FALLBACK, 1.0);
        assert_eq!(envelope.message, "hi");
        assert_eq!(envelope.response, "hi");
    }

    #[test]
    fn test_blank_reply_uses_fallback() {
        let envelope =
            ChatEnvelope::merge(reply(json!({"response": "  ", "sources": null})), None, FALLBACK, 1.0);
        assert_eq!(envelope.response, FALLBACK);
        assert_eq!(envelope.message, FALLBACK);
        assert!(envelope.sources.is_empty());
    }

    #[test]
    fn test_conversation_id_precedence() {
        let merged = ChatEnvelope::merge(
            reply(json!({"response": "ok", "conversation_id": "upstream-1"})),
            Some("caller-1"),
            FALLBACK,
            1.0,
        );
        assert_eq!(merged.conversation_id.as_deref(), Some("upstream-1"));

        let merged = ChatEnvelope::merge(reply(json!({"response": "ok"})), Some("caller-1"), FALLBACK, 1.0);
        assert_eq!(merged.conversation_id.as_deref(), Some("caller-1"));

        let merged = ChatEnvelope::merge(reply(json!({"response": "ok"})), None, FALLBACK, 1.0);
        assert_eq!(merged.conversation_id, None);
    }

    #[test]
    fn test_upstream_timing_is_kept() {
        let merged = ChatEnvelope::merge(
            reply(json!({
                "response": "ok",
                "sources": [{"title": "Grounding exercises"}],
                "processing_time_ms": 812.5,
                "timestamp": "2024-05-01T10:00:00Z"
            })),
            None,
            FALLBACK,
            3.0,
        );
        assert_eq!(merged.processing_time_ms, 812.5);
        assert_eq!(merged.timestamp, "2024-05-01T10:00:00Z");
        assert_eq!(merged.sources.len(), 1);

        let merged = ChatEnvelope::merge(reply(json!({"response": "ok"})), None, FALLBACK, 3.0);
        assert_eq!(merged.processing_time_ms, 3.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&merged.timestamp).is_ok());
    }

    #[test]
    fn test_reply_serializes_flat() {
        let reply = ChatReply {
            envelope: ChatEnvelope::fallback(FALLBACK, None),
            sentiment: SentimentResult::neutral("hi"),
            intent: IntentResult::seeking_advice("hi"),
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["response"], FALLBACK);
        assert_eq!(value["conversation_id"], Value::Null);
        assert_eq!(value["sentiment"]["sentiment"], "neutral");
        assert_eq!(value["intent"]["all_intents"]["venting"], 0.2);
    }

    #[test]
    fn test_sentiment_keeps_upstream_fields() {
        let result: SentimentResult = serde_json::from_value(json!({
            "sentiment": "positive",
            "compound": 0.8,
            "emotion": "joy"
        }))
        .unwrap();
        let result = result.for_text("yay");

        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.text, "yay");
        assert_eq!(result.scores, SentimentScores::default());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["emotion"], "joy");
        assert_eq!(value["compound"], 0.8);
    }

    #[test]
    fn test_unknown_sentiment_label_is_kept() {
        let result: SentimentResult =
            serde_json::from_value(json!({"text": "meh", "sentiment": "mixed"})).unwrap();
        assert_eq!(result.sentiment, Sentiment::Other("mixed".to_string()));
        assert_eq!(serde_json::to_value(&result).unwrap()["sentiment"], "mixed");
    }

    #[test]
    fn test_intent_keeps_upstream_fields() {
        let result: IntentResult = serde_json::from_value(json!({
            "primary_intent": "emergency",
            "is_emergency": true,
            "recommended_action": "hotline"
        }))
        .unwrap();

        assert!(result.is_emergency);
        assert!(result.all_intents.is_empty());
        let value = serde_json::to_value(result.for_text("help")).unwrap();
        assert_eq!(value["recommended_action"], "hotline");
        assert_eq!(value["text"], "help");
    }
}
