//! Error types for the gateway.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can surface from a gateway request.
#[derive(Error, Debug)]
pub enum Error {
    /// A required input was absent or empty
    #[error("{0}")]
    MissingField(String),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query string could not be parsed
    #[error("{0}")]
    InvalidQuery(String),

    /// Missing or invalid credential
    #[error("{0}")]
    Unauthorized(String),

    /// Not found error
    #[error("{0}")]
    NotFound(String),

    /// Route exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A pass-through upstream answered with a non-2xx status
    #[error("{message} (upstream status {status})")]
    Upstream {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// A pass-through upstream could not be reached or answered garbage
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingField(_) | Error::InvalidBody(_) | Error::InvalidQuery(_) => 400,
            Error::Unauthorized(_) => 401,
            Error::NotFound(_) => 404,
            Error::MethodNotAllowed => 405,
            Error::Upstream { status, .. } => *status,
            Error::UpstreamUnavailable(_) => 502,
            _ => 500,
        }
    }

    /// Message shown to the caller. Local faults are not described.
    pub fn public_message(&self) -> String {
        match self {
            Error::Upstream { message, .. } => message.clone(),
            Error::Config(_) | Error::Serialization(_) | Error::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingField("Message is required".into()).status_code(), 400);
        assert_eq!(Error::Unauthorized("Invalid token".into()).status_code(), 401);
        assert_eq!(Error::NotFound("Journal entry not found".into()).status_code(), 404);
        assert_eq!(Error::InvalidQuery("duplicate field".into()).status_code(), 400);
        assert_eq!(Error::MethodNotAllowed.status_code(), 405);
        assert_eq!(Error::UpstreamUnavailable("down".into()).status_code(), 502);
        assert_eq!(Error::Internal("boom".into()).status_code(), 500);

        let upstream = Error::Upstream {
            status: 409,
            message: "Failed to register user".into(),
            body: None,
        };
        assert_eq!(upstream.status_code(), 409);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = Error::Internal("secret key rejected by backend".into());
        assert_eq!(err.public_message(), "Internal server error");

        let err = Error::MissingField("Title and content are required".into());
        assert_eq!(err.public_message(), "Title and content are required");
    }
}
