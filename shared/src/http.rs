//! HTTP helpers for gateway handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{error, warn};
use validator::Validate;

use crate::{Error, Result};

/// Parse a request body as JSON. An empty body reads as `{}` so that
/// missing fields are reported by validation rather than as a parse error.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| Error::InvalidBody(e.to_string()))
}

/// Validate a request DTO, reporting any failure as a missing field.
pub fn require<T: Validate>(value: &T, message: &str) -> Result<()> {
    value
        .validate()
        .map_err(|_| Error::MissingField(message.to_string()))
}

/// Parse a numeric query value leniently: anything that is not a positive
/// integer falls back to `default`.
pub fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let message = self.public_message();
        let body = match self {
            // Forward the upstream's own JSON, making sure it names the failure
            Error::Upstream {
                body: Some(Value::Object(mut fields)),
                ..
            } => {
                fields.entry("error").or_insert_with(|| json!(message));
                Value::Object(fields)
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
