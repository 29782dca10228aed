//! Outbound calls to capability services.
//!
//! Every call carries its own deadline. Callers then pick a policy:
//! [`degrade`] swaps any failure for a default value, while
//! [`UpstreamFailure::into_error`] and [`into_lookup`] surface the failure to
//! the client.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Error;

/// Why an upstream call did not produce a usable payload.
#[derive(Error, Debug)]
pub enum UpstreamFailure {
    #[error("upstream answered {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
    #[error("upstream timed out")]
    Timeout,
    #[error("upstream unreachable: {0}")]
    Transport(String),
    #[error("upstream payload not understood: {0}")]
    Decode(String),
}

impl UpstreamFailure {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamFailure::Timeout
        } else if e.is_decode() {
            UpstreamFailure::Decode(e.to_string())
        } else {
            UpstreamFailure::Transport(e.to_string())
        }
    }

    /// Status code of a non-2xx answer.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convert into the error returned to the caller of a pass-through route.
    pub fn into_error(self, message: &str) -> Error {
        match self {
            UpstreamFailure::Status { status, body } => Error::Upstream {
                status: status.as_u16(),
                message: message.to_string(),
                body,
            },
            _ => Error::UpstreamUnavailable(message.to_string()),
        }
    }
}

/// Outcome of a single-entity lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// Map a 404 to [`Lookup::NotFound`]; any other failure becomes an error.
pub fn into_lookup<T>(
    result: Result<T, UpstreamFailure>,
    message: &str,
) -> crate::Result<Lookup<T>> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(failure) if failure.status() == Some(StatusCode::NOT_FOUND) => Ok(Lookup::NotFound),
        Err(failure) => Err(failure.into_error(message)),
    }
}

/// Absorb a failure into a default value.
pub fn degrade<T>(
    result: Result<T, UpstreamFailure>,
    service: &str,
    fallback: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(value) => value,
        Err(failure) => {
            warn!(service, error = %failure, "Upstream call failed, using default");
            fallback()
        }
    }
}

/// Shared client for one capability service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    service: &'static str,
    base_url: String,
}

impl UpstreamClient {
    /// Create a client rooted at `base_url`.
    pub fn new(http: reqwest::Client, service: &'static str, base_url: impl Into<String>) -> Self {
        Self {
            http,
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Name used in logs.
    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Build a request for `path` (which starts with `/`).
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("content-type", "application/json")
    }

    /// Send a request with a deadline and decode the JSON answer.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, UpstreamFailure> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(UpstreamFailure::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(service = self.service, %status, body = %text, "Upstream returned error status");
            return Err(UpstreamFailure::Status {
                status,
                body: serde_json::from_str(&text).ok(),
            });
        }

        let bytes = response.bytes().await.map_err(UpstreamFailure::from_reqwest)?;
        debug!(service = self.service, bytes = bytes.len(), "Upstream answered");
        // Some endpoints answer 2xx with no body
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|e| UpstreamFailure::Decode(e.to_string()))
    }
}

/// Percent-encode a value for use as one path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> UpstreamClient {
        UpstreamClient::new(reqwest::Client::new(), "test", server.uri())
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [1, 2]})))
            .mount(&server)
            .await;

        let upstream = client(&server);
        let value: Value = upstream
            .send(upstream.request(Method::GET, "/things"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, json!({"items": [1, 2]}));
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "exists"})))
            .mount(&server)
            .await;

        let upstream = client(&server);
        let failure = upstream
            .send::<Value>(upstream.request(Method::POST, "/things"), Duration::from_secs(1))
            .await
            .unwrap_err();

        match failure.into_error("Failed to create thing") {
            Error::Upstream { status, message, body } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Failed to create thing");
                assert_eq!(body, Some(json!({"error": "exists"})));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let upstream = client(&server);
        let failure = upstream
            .send::<Value>(upstream.request(Method::GET, "/slow"), Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(failure, UpstreamFailure::Timeout));
        assert!(matches!(
            failure.into_error("Failed"),
            Error::UpstreamUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let upstream = UpstreamClient::new(reqwest::Client::new(), "test", "http://127.0.0.1:9");
        let failure = upstream
            .send::<Value>(upstream.request(Method::GET, "/"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(failure, UpstreamFailure::Transport(_) | UpstreamFailure::Timeout));
    }

    #[test]
    fn test_lookup_maps_not_found() {
        let missing: Result<Value, _> = Err(UpstreamFailure::Status {
            status: StatusCode::NOT_FOUND,
            body: None,
        });
        assert_eq!(into_lookup(missing, "Failed").unwrap(), Lookup::NotFound);

        let broken: Result<Value, _> = Err(UpstreamFailure::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: None,
        });
        assert!(into_lookup(broken, "Failed").is_err());
    }

    #[test]
    fn test_degrade_uses_fallback() {
        let failed: Result<u32, _> = Err(UpstreamFailure::Timeout);
        assert_eq!(degrade(failed, "test", || 7), 7);
        assert_eq!(degrade(Ok(3), "test", || 7), 3);
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }
}
