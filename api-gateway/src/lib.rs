//! Companion API gateway.
//!
//! Endpoints:
//! - POST /api/auth/register, POST /api/auth/login
//! - POST /api/chat/message, GET /api/chat/resources, GET /api/chat/history
//! - POST|GET /api/journal, GET /api/journal/search, GET|PUT|DELETE /api/journal/{id}
//! - POST|GET /api/emotions, GET /api/emotions/stats, GET /api/emotions/by-type
//! - GET /health

pub mod extract;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::http::header::{self, HeaderName, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use shared::upstream::UpstreamClient;
use shared::{
    AccountsClient, ChatOrchestrator, Config, EmotionClient, Error, IntentClient, JournalClient,
    RagClient, Result, SentimentClient, TokenVerifier,
};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Hardening headers added to every response that does not set its own.
const SECURITY_HEADERS: [(HeaderName, &str); 8] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (header::X_XSS_PROTECTION, "0"),
    (HeaderName::from_static("x-download-options"), "noopen"),
    (HeaderName::from_static("x-permitted-cross-domain-policies"), "none"),
];

/// Application state shared across requests. Every client is stateless and
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub chat: ChatOrchestrator,
    pub rag: RagClient,
    pub journal: JournalClient,
    pub emotions: EmotionClient,
    pub accounts: AccountsClient,
    pub emotions_require_auth: bool,
}

impl AppState {
    /// Build the clients for every capability service.
    pub fn new(config: &Config, jwt_secret: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("companion-api-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let upstream = |service: &'static str, url: &str| UpstreamClient::new(http.clone(), service, url);
        let timeout = config.upstream_timeout;

        let rag = RagClient::new(
            upstream("rag", &config.rag_service_url),
            timeout,
            config.generation_timeout,
            config.chat_fallback_message.clone(),
        )
        .with_forward_analysis(config.rag_forward_analysis);

        let chat = ChatOrchestrator::new(
            SentimentClient::new(upstream("sentiment", &config.sentiment_service_url), timeout),
            IntentClient::new(upstream("intent", &config.intent_service_url), timeout),
            rag.clone(),
        );

        Ok(Self {
            verifier: Arc::new(TokenVerifier::new(jwt_secret)),
            chat,
            rag,
            journal: JournalClient::new(
                upstream("journal", &config.journal_service_url),
                timeout,
                config.generation_timeout,
            ),
            emotions: EmotionClient::new(upstream("emotions", &config.emotion_service_url), timeout),
            accounts: AccountsClient::new(upstream("auth", &config.auth_service_url), timeout),
            emotions_require_auth: config.emotions_require_auth,
        })
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    let gate = || axum::middleware::from_fn_with_state(state.clone(), middleware::require_auth);

    let protected = Router::new()
        .route("/api/chat/message", post(routes::chat::send_message))
        .route("/api/chat/resources", get(routes::chat::resources))
        .route("/api/chat/history", get(routes::chat::history))
        .route(
            "/api/journal",
            post(routes::journal::create_entry).get(routes::journal::list_entries),
        )
        .route("/api/journal/search", get(routes::journal::search_entries))
        .route(
            "/api/journal/:id",
            get(routes::journal::get_entry)
                .put(routes::journal::update_entry)
                .delete(routes::journal::delete_entry),
        )
        .route_layer(gate());

    let emotions = Router::new()
        .route(
            "/api/emotions",
            post(routes::emotions::create_emotion).get(routes::emotions::list_emotions),
        )
        .route("/api/emotions/stats", get(routes::emotions::emotion_stats))
        .route("/api/emotions/by-type", get(routes::emotions::emotions_by_type));
    let emotions = if state.emotions_require_auth {
        emotions.route_layer(gate())
    } else {
        emotions
    };

    let mut app = Router::new()
        .route("/health", get(routes::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected)
        .merge(emotions)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }

    app.with_state(state)
}
