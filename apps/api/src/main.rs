mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::JobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Ranker v{}", env!("CARGO_PKG_VERSION"));

    // Upload root holds one directory per job
    tokio::fs::create_dir_all(&config.upload_root)
        .await
        .with_context(|| format!("Failed to create upload root {}", config.upload_root.display()))?;
    let store = JobStore::new(&config.upload_root);
    info!("Upload root: {}", store.root().display());

    // Initialize LLM client
    let llm = LlmClient::new(config.llm.clone())?;
    info!(
        "LLM client initialized (provider: {:?}, model: {}, retries: {}, timeout: {}s)",
        llm.provider(),
        llm.model(),
        config.llm.max_retries,
        config.llm.timeout.as_secs()
    );

    let state = AppState {
        config: config.clone(),
        oracle: Arc::new(llm),
        extractor: Arc::new(PdfTextExtractor),
        store,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
