use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_session, trace_id};
use crate::routes::{auth, health, profile};
use crate::services::SmsService;
use domain::services::OtpSender;
use shared::session::SessionKeys;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub session_keys: Arc<SessionKeys>,
    pub sms: Arc<dyn OtpSender>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let session_keys = Arc::new(SessionKeys::new(
        &config.session.secret,
        config.session.token_expiry_secs,
        config.session.leeway_secs,
    ));
    let sms: Arc<dyn OtpSender> = Arc::new(SmsService::new(&config.sms));

    let state = AppState {
        pool,
        config: config.clone(),
        session_keys,
        sms,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Authentication flow and explicit registration (no session required)
    let auth_routes = Router::new()
        .route("/api/v1/auth/otp/request", post(auth::request_otp))
        .route("/api/v1/auth/otp/verify/:phone", post(auth::verify_otp))
        .route("/api/v1/profile", put(profile::register));

    // Profile routes (require a session token)
    let session_routes = Router::new()
        .route("/api/v1/profile", get(profile::get_profile))
        .route("/api/v1/profile", patch(profile::update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(session_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
