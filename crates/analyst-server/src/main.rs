//! Stock Analyst HTTP Server
//!
//! Axum server exposing the agentic stock analyzer: a streaming chat
//! endpoint relaying orchestration events over SSE, a synchronous chat
//! endpoint, and a raw market data endpoint.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyst_core::{MemorySessionStore, Orchestrator};
use analyst_runtime::chains_from_env;
use stock_analyst::{all_workers, MarketDataCache, MockMarketData};

use crate::handlers::{chat_stream, chat_sync, health_check, stock_data};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    // Oracle fallback chains (primary first) from ORACLE_ORDER.
    let (decision, generation) = chains_from_env();
    tracing::info!(oracles = decision.len(), "oracle chain configured");

    // Market data: mock provider behind the bounded cache.
    let cache = Arc::new(MarketDataCache::new(Arc::new(MockMarketData::new())));

    let workers = all_workers(Arc::new(generation), Arc::clone(&cache));
    tracing::info!(workers = workers.len(), "analyst team assembled");
    for worker in &workers {
        tracing::info!(worker = %worker.kind(), tools = ?worker.tools().names(), "  roster");
    }

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(decision),
        workers,
        Arc::new(MemorySessionStore::new()),
    ));

    let state = AppState {
        orchestrator,
        cache,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_sync))
        .route("/api/chat/stream", post(chat_stream))
        .route("/api/stock/{ticker}", get(stock_data))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("stock-analyst server listening on http://{}", addr);
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  POST /api/chat            - One analysis turn (JSON)");
    tracing::info!("  POST /api/chat/stream     - One analysis turn (SSE)");
    tracing::info!("  GET  /api/stock/{{ticker}}  - Raw market data");

    axum::serve(listener, app).await?;

    Ok(())
}
