//! # credex-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the credex verification pipeline.
//! Binds to a configurable port (default 3031).

use credex_api::state::{AppConfig, AppState};
use credex_authority_client::{AuthorityClient, AuthorityConfig};

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
        .unwrap_or(3031);

    let authority_config = AuthorityConfig::from_env().map_err(|e| {
        tracing::error!("Authority client not configured: {e}");
        anyhow::Error::from(e)
    })?;
    tracing::info!(authority = %authority_config.base_url, "authority client configured");
    let authority = AuthorityClient::new(authority_config)?;

    let state = AppState::new(AppConfig { port }, authority);
    let app = credex_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("credex API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
