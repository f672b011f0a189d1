//! HTTP Handlers
//!
//! REST endpoints plus the SSE chat stream. Each chat request submits one
//! turn to the orchestrator and relays its ordered event sequence; the
//! non-streaming variant collects the same sequence and returns it whole.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;

use analyst_core::TurnEvent;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub workers: usize,
    pub market_data_provider: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Conversation thread to continue; omitted starts a new one
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub thread_id: String,
    pub summary: String,
    pub events: Vec<TurnEvent>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub ticker: String,
    pub last_close: Option<f64>,
    pub profile: stock_analyst::CompanyProfile,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        workers: state.orchestrator.worker_count(),
        market_data_provider: state.cache.provider_name().to_string(),
    })
}

fn stage_name(event: &TurnEvent) -> &'static str {
    match event {
        TurnEvent::WorkerStart { .. } => "worker_start",
        TurnEvent::WorkerOutput { .. } => "worker_output",
        TurnEvent::Error { .. } => "error",
        TurnEvent::Done { .. } => "done",
    }
}

fn sse_event(event: &TurnEvent) -> Event {
    let sse = Event::default().event(stage_name(event));
    match sse.json_data(event) {
        Ok(sse) => sse,
        // TurnEvent serialization is infallible in practice; keep the
        // stream alive if it ever is not.
        Err(e) => Event::default()
            .event("error")
            .data(format!("event serialization failed: {e}")),
    }
}

/// Streaming chat endpoint: one SSE event per orchestration stage
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let thread_id = payload
        .thread_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(thread = %thread_id, "chat turn submitted (stream)");

    let events = state
        .orchestrator
        .submit_turn(&thread_id, payload.message)
        .map(|event| Ok(sse_event(&event)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Non-streaming chat endpoint: collects the full event sequence
pub async fn chat_sync(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let thread_id = payload
        .thread_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(thread = %thread_id, "chat turn submitted");

    let events: Vec<TurnEvent> = state
        .orchestrator
        .submit_turn(&thread_id, payload.message)
        .collect()
        .await;

    let summary = events
        .iter()
        .rev()
        .find_map(|e| match e {
            TurnEvent::Done { summary } => Some(summary.clone()),
            TurnEvent::Error { message } => Some(message.clone()),
            _ => None,
        })
        .unwrap_or_default();

    Json(ChatResponse {
        thread_id,
        summary,
        events,
    })
}

/// Raw market data for one ticker, bypassing the agent
pub async fn stock_data(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockResponse>, (StatusCode, Json<ErrorResponse>)> {
    let series = state.cache.series(&ticker, 1).await.map_err(|e| {
        tracing::error!(%ticker, error = %e, "market data fetch failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let profile = state.cache.profile(&ticker).await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    if series.is_empty() && profile.current_price.is_none() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No data for ticker {}", ticker.to_uppercase()),
            }),
        ));
    }

    Ok(Json(StockResponse {
        ticker: ticker.to_uppercase(),
        last_close: series.last_close(),
        profile,
    }))
}
