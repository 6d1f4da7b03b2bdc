//! Ingest endpoint handlers.
//!
//! These handlers only hand the body to the queue and return; all decoding
//! happens in the relay.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::queue::MessageQueue;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<dyn MessageQueue>,
}

impl AppState {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        Self { queue }
    }
}

/// Build the ingest router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/queues/:queue/messages", post(publish_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Publish
// =============================================================================

/// Publish response.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    pub queue: String,
}

/// Publish the raw request body to `queue`.
pub async fn publish_message(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    body: String,
) -> impl IntoResponse {
    info!(queue = %queue, body_length = body.len(), "ingest_message_received");

    if let Err(e) = state.queue.publish(&queue, body).await {
        error!(queue = %queue, error = %e, "ingest_publish_failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(PublishResponse {
                status: "error",
                queue,
            }),
        );
    }

    info!(queue = %queue, "ingest_enqueued");

    (
        StatusCode::OK,
        Json(PublishResponse {
            status: "enqueued",
            queue,
        }),
    )
}
