//! Request tracing middleware.
//!
//! Tags every request with an ID, runs it inside a tracing span carrying
//! that ID, and echoes the ID back to the client.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request ID, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Middleware that correlates logs by request ID.
///
/// A client-supplied `X-Request-ID` is reused so the ID stays stable
/// across proxies; otherwise a fresh UUID v4 is generated. The span wraps
/// the whole downstream future, so every log line emitted while handling
/// the request carries the ID.
pub async fn trace_id(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = async {
        let start = std::time::Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }

    response
}
