//! HTTP metrics middleware.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

/// Metric names.
pub mod names {
    /// Requests served, by method, route and status.
    pub const HTTP_REQUESTS_TOTAL: &str = "tessera_http_requests_total";
    /// Request latency in seconds, by method, route and status.
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "tessera_http_request_duration_seconds";
}

/// Register HTTP metric descriptions.
pub fn register_http_metrics() {
    describe_counter!(names::HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
    describe_histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "Duration of HTTP requests in seconds"
    );
}

/// Records a counter and a latency histogram for every request.
///
/// The `path` label is the matched route template (`/users/:id`), never the
/// raw URI, so ids do not create new series.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let labels = [("method", method), ("path", path), ("status", status)];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels)
        .record(start.elapsed().as_secs_f64());

    response
}
