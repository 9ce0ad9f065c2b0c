// src/logging_middleware.rs
//! Middleware for logging one line per request

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Logs method, path, status and latency. Server errors log at `warn`,
/// health checks at `debug`.
pub async fn log_request_response(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "📤 Response");
    } else if path == "/" {
        debug!(%method, %path, status = status.as_u16(), elapsed_ms, "📤 Response");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "📤 Response");
    }

    response
}
