mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod recommendation;
mod routes;
mod session;
mod state;
mod translation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Tracing targets use the bin crate name, not the package name.
            EnvFilter::new(format!("api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kadra API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the generation engine client
    let engine = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("Engine client initialized (model: {})", llm_client::MODEL);

    // Build app state: one in-memory session seeded with the sample profile
    let state = AppState::new(engine);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
