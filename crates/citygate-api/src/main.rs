//! # citygate-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the CityGate service.
//! Binds to configurable port (default 8080). Refuses to start without a
//! verification key: there is no auth-disabled fallback.

use anyhow::Context;

use citygate_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let jwt_secret = std::env::var("CITYGATE_JWT_SECRET").ok();
    let config = AppConfig { port, jwt_secret };
    tracing::info!(?config, "configuration loaded");

    let state = AppState::try_with_config(config)
        .context("refusing to start: the gate cannot be configured")?;

    let app = citygate_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("CityGate API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
