//! Session token authentication middleware.
//!
//! Validates the Bearer token issued at OTP verification and exposes the
//! authenticated phone number to downstream handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;
use shared::session::SessionKeys;
use shared::validation::is_valid_phone;

/// Authenticated session information extracted from the token.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    /// Phone number from the token subject claim.
    pub phone: String,
    /// Token ID (jti) for session tracking.
    pub jti: String,
}

impl SessionAuth {
    /// Validates a session token and returns the authenticated identity.
    pub fn validate(keys: &SessionKeys, token: &str) -> Result<Self, String> {
        let claims = keys
            .validate(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        if !is_valid_phone(&claims.sub) {
            return Err("Invalid subject in token".to_string());
        }

        Ok(SessionAuth {
            phone: claims.sub,
            jti: claims.jti,
        })
    }
}

/// Middleware that requires a valid session token.
///
/// Validates the Bearer token in the Authorization header and rejects
/// requests without one. Authenticated session information is stored in
/// request extensions for use by downstream handlers.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match SessionAuth::validate(&state.session_keys, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("Session validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
