mod config;
mod errors;
mod llm_client;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::flow::ScreeningFlow;
use crate::screening::store::SessionStore;
use crate::state::AppState;

const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_api_url.clone(),
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_retries,
    )
    .context("Failed to build LLM client")?;
    info!(
        "LLM client initialized (model: {}, retries: {})",
        llm_client::MODEL,
        config.llm_max_retries
    );

    let sessions = SessionStore::default();
    let state = AppState {
        flow: ScreeningFlow::new(Arc::new(llm)),
        sessions: sessions.clone(),
    };

    // Spawn idle session pruning task
    let session_idle_timeout = Duration::from_secs(config.session_idle_timeout_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        interval.tick().await; // Skip immediate first tick
        loop {
            interval.tick().await;
            let removed = sessions.prune_idle(session_idle_timeout).await;
            if removed > 0 {
                info!(removed, "Pruned idle sessions");
            }
        }
    });

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
