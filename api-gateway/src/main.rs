//! Companion API gateway binary.
//!
//! Serves the router on `$PORT`, or under the Lambda runtime when one is
//! present.

use std::net::SocketAddr;

use api_gateway::{router, AppState};
use lambda_http::{run, Error};
use shared::{resolve_jwt_secret, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let jwt_secret = resolve_jwt_secret(&config).await?;
    let app = router(AppState::new(&config, &jwt_secret)?);

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Starting under the Lambda runtime");
        return run(app).await;
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API Gateway listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
