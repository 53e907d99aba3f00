//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection and export.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use std::sync::OnceLock;
use std::time::Instant;

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    let method_str = method_to_str(&method);

    counter!(
        "http_requests_total",
        "method" => method_str.to_string(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method_str.to_string(),
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Record a one-time password issued to a phone number.
pub fn record_otp_issued() {
    counter!("otp_issued_total").increment(1);
}

/// Record the outcome of an OTP verification attempt.
pub fn record_otp_verification(outcome: &'static str) {
    counter!("otp_verifications_total", "outcome" => outcome).increment(1);
}

/// Record a new account registration.
pub fn record_account_registered() {
    counter!("accounts_registered_total").increment(1);
}

/// Record an invite code attachment.
pub fn record_invite_attached() {
    counter!("invites_attached_total").increment(1);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        let output = handle.render();
        (
            axum::http::StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            output,
        )
    } else {
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            [(axum::http::header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        )
    }
}

static PROMETHEUS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Must be called once during application startup before any metrics are
/// recorded. Uses `install_recorder()` which sets up the global recorder and
/// returns a handle used to render Prometheus-formatted output.
pub fn init_metrics() {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let builder = PrometheusBuilder::new();

    let handle = match builder
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])
    {
        Ok(builder) => match builder.install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("Failed to install Prometheus recorder: {}", e);
                return;
            }
        },
        Err(e) => {
            tracing::warn!("Failed to set histogram buckets: {}", e);
            return;
        }
    };

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_str() {
        assert_eq!(method_to_str(&Method::GET), "GET");
        assert_eq!(method_to_str(&Method::POST), "POST");
        assert_eq!(method_to_str(&Method::PUT), "PUT");
        assert_eq!(method_to_str(&Method::PATCH), "PATCH");
    }

    #[test]
    fn test_method_to_str_other() {
        assert_eq!(method_to_str(&Method::TRACE), "OTHER");
    }
}
