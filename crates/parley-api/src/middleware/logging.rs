use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs method, path, status and latency of every request.
/// Polling endpoints are logged at debug level.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if uri.path().ends_with("/status") {
        tracing::debug!(method = %method, uri = %uri, status = %status, duration_ms = %duration_ms, "Request processed");
    } else {
        tracing::info!(method = %method, uri = %uri, status = %status, duration_ms = %duration_ms, "Request processed");
    }

    response
}
