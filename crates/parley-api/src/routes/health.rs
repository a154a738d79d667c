use axum::{extract::State, Json};
use parley_dispatch::StoreCounts;
use parley_types::Modality;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
    pub jobs: JobCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobCounts {
    pub queued: usize,
    pub pending: usize,
    pub processing: usize,
    /// Finished, waiting to be polled
    pub completed: usize,
}

impl JobCounts {
    fn new(queued: usize, counts: StoreCounts) -> Self {
        Self {
            queued,
            pending: counts.pending,
            processing: counts.processing,
            completed: counts.completed,
        }
    }
}

/// Health check endpoint
///
/// Reports the configured provider and dispatcher state. The model provider
/// itself is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let dispatcher = &state.app.dispatcher;
    let mut services = HashMap::new();

    services.insert("provider".to_string(), state.app.client.provider().to_string());
    services.insert(
        "dispatcher".to_string(),
        if dispatcher.is_closed() { "stopped" } else { "running" }.to_string(),
    );
    services.insert(
        "vision".to_string(),
        if state.app.sessions.supports(Modality::Multimodal) {
            "available"
        } else {
            "unavailable"
        }
        .to_string(),
    );

    let counts = dispatcher.counts().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
        jobs: JobCounts::new(dispatcher.queued(), counts),
    })
}
