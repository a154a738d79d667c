use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    middleware::logging,
    routes::{conversations, documents, health, jobs, models, ApiDoc},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Jobs (static paths win over :job_id)
        .route("/jobs/text", post(jobs::submit_text))
        .route("/jobs/image", post(jobs::submit_image))
        .route("/jobs/status", get(jobs::poll_status))
        .route("/jobs/:job_id", get(jobs::poll_job))
        // Conversations
        .route("/conversations/reset", post(conversations::reset))
        // Documents
        .route("/documents/summarize", post(documents::summarize))
        // Models
        .route("/models", get(models::list_models))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs.max(1));

    api_routes
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
