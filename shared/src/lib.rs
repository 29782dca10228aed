//! Shared library for the companion API gateway.
//!
//! This crate provides the error taxonomy, configuration, token verification
//! and the clients for every capability service the gateway fronts.

pub mod accounts;
pub mod auth;
pub mod chat;
pub mod config;
pub mod emotions;
pub mod error;
pub mod http;
pub mod intent;
pub mod journal;
pub mod models;
pub mod rag;
pub mod secrets;
pub mod sentiment;
pub mod upstream;

pub use accounts::{AccountsClient, Credentials, Registration};
pub use auth::{bearer_token, Claims, TokenVerifier};
pub use chat::{ChatOrchestrator, ChatRequest};
pub use config::Config;
pub use emotions::{EmotionClient, NewEmotion};
pub use error::{Error, Result};
pub use intent::IntentClient;
pub use journal::{JournalClient, JournalListing, NewJournalEntry};
pub use models::{ChatEnvelope, ChatReply, IntentResult, SentimentResult};
pub use rag::RagClient;
pub use secrets::resolve_jwt_secret;
pub use sentiment::SentimentClient;
pub use upstream::{Lookup, UpstreamClient};
