//! HTTP request metrics middleware

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Records per-request counters and latency for the parking API:
///
/// - `smartpark_http_requests_total` counter with labels `method`, `path`, `status`
/// - `smartpark_http_request_duration_seconds` histogram with labels `method`, `path`
///
/// The `path` label is the matched route template, so `/api/v1/cars/{plate}`
/// stays one series no matter the plate.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    };

    let started = Instant::now();
    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "smartpark_http_requests_total",
        "method" => method.clone(), "path" => path.clone(), "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "smartpark_http_request_duration_seconds",
        "method" => method, "path" => path
    )
    .record(started.elapsed().as_secs_f64());

    response
}
