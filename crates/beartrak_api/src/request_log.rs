//! Access logging middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs one `http_request` event per request, tagged with the request id
/// assigned by the outer request-id layer.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=api method={} path={} status={} duration_ms={} request_id={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis(),
        request_id
    );
    response
}
