//! JWT authentication utilities.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

const NO_TOKEN: &str = "No token provided";
const INVALID_TOKEN: &str = "Invalid token";

/// JWT claims issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id (journal-era tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    /// User id (chat-era tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Identity attached to a request after its token verified.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// Caller's user id
    pub user_id: String,
    /// Caller's email
    pub email: Option<String>,
    /// Expiration, seconds since the epoch
    pub expires_at: Option<i64>,
}

impl TryFrom<TokenClaims> for Claims {
    type Error = Error;

    fn try_from(claims: TokenClaims) -> Result<Self> {
        let user_id = [claims.user_id.as_ref(), claims.id.as_ref()]
            .into_iter()
            .flatten()
            .find_map(claim_as_string)
            .or_else(|| claims.sub.clone().filter(|s| !s.is_empty()))
            .ok_or_else(|| Error::Unauthorized(INVALID_TOKEN.to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            expires_at: claims.exp,
        })
    }
}

fn claim_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthorized(NO_TOKEN.to_string()))
}

/// Verifies HS256 bearer tokens against the shared secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier for the given shared secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked when present but not demanded
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate an `Authorization` header and extract the caller's claims.
    pub fn verify(&self, header: Option<&str>) -> Result<Claims> {
        let token = bearer_token(header)?;
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingAlgorithm
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => {
                    tracing::debug!("Rejected token: {}", e);
                    Error::Unauthorized(INVALID_TOKEN.to_string())
                }
                _ => Error::Internal(format!("Token verification failed: {}", e)),
            }
        })?;

        Claims::try_from(data.claims)
    }
}
