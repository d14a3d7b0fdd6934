//! Access logging

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use chrono::Utc;
use tracing::info;

/// Emit one structured line per request: method, path, timestamp, status and latency.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let timestamp = Utc::now().to_rfc3339();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        %timestamp,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request"
    );

    response
}
