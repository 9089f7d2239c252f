mod catalog;
mod config;
mod db;
mod embedder;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod search_log;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::backfill::{backfill_job_embeddings, DEFAULT_BATCH_SIZE};
use crate::catalog::pg::PgCatalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::embedder::OpenAiEmbedder;
use crate::llm_client::LlmClient;
use crate::matching::extractor::LlmPreferenceExtractor;
use crate::matching::MatchEngine;
use crate::routes::build_router;
use crate::search_log::PgSearchLog;
use crate::state::AppState;

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

    info!("Starting job matching API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize the external service clients
    let llm = LlmClient::new(config.openai_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let embedder = Arc::new(OpenAiEmbedder::new(config.openai_api_key.clone()));
    info!(
        "Embedding client initialized (model: {})",
        embedder::EMBEDDING_MODEL
    );

    let engine = MatchEngine::new(
        Arc::new(LlmPreferenceExtractor::new(llm)),
        embedder.clone(),
        Arc::new(PgSearchLog::new(pool.clone())),
    );

    spawn_embedding_backfill(pool.clone(), embedder, config.backfill_interval_secs);

    // Build app state
    let state = AppState {
        catalog: PgCatalog::new(pool),
        engine,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically embeds postings that do not yet have a stored vector.
/// Fire-and-forget relative to the search path; a failed pass only warns.
fn spawn_embedding_backfill(pool: PgPool, embedder: Arc<OpenAiEmbedder>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            match backfill_job_embeddings(&pool, embedder.as_ref(), DEFAULT_BATCH_SIZE).await {
                Ok(0) => {}
                Ok(count) => info!(count, "embedding backfill pass complete"),
                Err(err) => warn!(error = %err, "embedding backfill pass failed"),
            }
        }
    });
}
