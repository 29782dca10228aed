//! Configuration management for the gateway.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Reply used when the chat service cannot answer.
pub const DEFAULT_CHAT_FALLBACK: &str =
    "I'm here to listen and support you. How can I help you today?";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port
    pub port: u16,
    /// Auth service base URL
    pub auth_service_url: String,
    /// Sentiment analysis service base URL
    pub sentiment_service_url: String,
    /// Intent recognition service base URL
    pub intent_service_url: String,
    /// RAG/chat service base URL
    pub rag_service_url: String,
    /// Journal service base URL (the RAG service unless overridden)
    pub journal_service_url: String,
    /// Emotion tracking service base URL (the RAG service unless overridden)
    pub emotion_service_url: String,
    /// Shared secret used to verify bearer tokens
    pub jwt_secret: Option<String>,
    /// Secrets Manager ARN holding the verification secret
    pub jwt_secret_arn: Option<String>,
    /// Deadline for ordinary upstream calls
    pub upstream_timeout: Duration,
    /// Deadline for chat generation and journal creation
    pub generation_timeout: Duration,
    /// Text returned when the chat service fails
    pub chat_fallback_message: String,
    /// Forward sentiment and intent results to the chat service
    pub rag_forward_analysis: bool,
    /// Put the emotion routes behind the token gate
    pub emotions_require_auth: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let url = |key: &str, default: &str| {
            var(key)
                .unwrap_or_else(|| default.to_string())
                .trim_end_matches('/')
                .to_string()
        };

        let rag_service_url = url("RAG_SERVICE_URL", "http://rag-service:8002");

        Ok(Self {
            port: parse_or(var("PORT"), "PORT", 3000)?,
            auth_service_url: url("AUTH_SERVICE_URL", "http://auth-service:8003"),
            sentiment_service_url: url("SENTIMENT_SERVICE_URL", "http://sentiment-analysis:8000"),
            intent_service_url: url("INTENT_SERVICE_URL", "http://intent-recognition:8001"),
            journal_service_url: url("JOURNAL_SERVICE_URL", &rag_service_url),
            emotion_service_url: url("EMOTION_SERVICE_URL", &rag_service_url),
            rag_service_url,
            jwt_secret: var("JWT_SECRET"),
            jwt_secret_arn: var("JWT_SECRET_ARN"),
            upstream_timeout: Duration::from_millis(parse_or(
                var("UPSTREAM_TIMEOUT_MS"),
                "UPSTREAM_TIMEOUT_MS",
                5000,
            )?),
            generation_timeout: Duration::from_millis(parse_or(
                var("GENERATION_TIMEOUT_MS"),
                "GENERATION_TIMEOUT_MS",
                10000,
            )?),
            chat_fallback_message: var("CHAT_FALLBACK_MESSAGE")
                .unwrap_or_else(|| DEFAULT_CHAT_FALLBACK.to_string()),
            rag_forward_analysis: parse_flag(var("RAG_FORWARD_ANALYSIS"), "RAG_FORWARD_ANALYSIS")?,
            emotions_require_auth: parse_flag(
                var("EMOTIONS_REQUIRE_AUTH"),
                "EMOTIONS_REQUIRE_AUTH",
            )?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}

fn parse_flag(value: Option<String>, key: &str) -> Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(Error::Config(format!("{} must be a boolean, got {:?}", key, v))),
    }
}
