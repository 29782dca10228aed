//! Resolution of the token verification secret.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use tracing::info;

use crate::{Config, Error, Result};

/// JSON shape of a stored JWT secret.
#[derive(Debug, Deserialize)]
struct JwtSecretDocument {
    #[serde(alias = "JWT_SECRET", alias = "secret")]
    jwt_secret: String,
}

/// Fetch the string value stored at `secret_arn`.
async fn fetch_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to read secret {}: {}", secret_arn, e)))?;

    response
        .secret_string()
        .map(str::to_string)
        .ok_or_else(|| Error::Config(format!("Secret {} has no string value", secret_arn)))
}

/// Read the verification secret from a stored value: either a JSON document
/// with a `jwt_secret` key or the raw secret itself.
pub fn parse_jwt_secret(stored: &str) -> Result<String> {
    let secret = match serde_json::from_str::<JwtSecretDocument>(stored) {
        Ok(doc) => doc.jwt_secret,
        Err(_) => stored.trim().to_string(),
    };
    if secret.is_empty() {
        return Err(Error::Config("JWT secret is empty".to_string()));
    }
    Ok(secret)
}

/// Resolve the shared JWT secret: `JWT_SECRET` wins, otherwise it is read
/// from Secrets Manager at `JWT_SECRET_ARN`. Called once at start-up.
pub async fn resolve_jwt_secret(config: &Config) -> Result<String> {
    if let Some(secret) = &config.jwt_secret {
        return Ok(secret.clone());
    }

    let arn = config
        .jwt_secret_arn
        .as_deref()
        .ok_or_else(|| Error::Config("JWT_SECRET or JWT_SECRET_ARN must be set".to_string()))?;

    info!("Loading JWT secret from Secrets Manager");
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&aws_config);
    parse_jwt_secret(&fetch_secret(&client, arn).await?)
}
