//! OTP authentication endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_otp_issued, record_otp_verification};
use domain::error::AuthError;
use domain::models::Account;
use domain::services::OtpEngine;
use domain::store::ProfileStore;
use persistence::repositories::ProfileRepository;
use shared::validation::is_valid_phone;

/// Request body for OTP issuance.
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpBody {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[validate(custom(function = "shared::validation::validate_invite_code"))]
    pub invite: Option<String>,
}

/// Response for OTP issuance.
#[derive(Debug, Serialize)]
pub struct RequestOtpResponse {
    pub detail: String,
    pub login_url: String,
}

/// Request body for OTP verification.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    pub otp: i32,
}

/// Account summary returned on successful verification.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub phone: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub invite_code: Option<String>,
    pub invited_by_code: Option<String>,
}

/// Response for successful OTP verification.
#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub token_type: String,
    pub account: AccountSummary,
}

fn otp_engine(state: &AppState) -> OtpEngine<ProfileRepository> {
    OtpEngine::new(
        ProfileRepository::new(state.pool.clone()),
        state.config.otp.to_engine_config(),
        state.sms.clone(),
    )
}

/// POST /api/v1/auth/otp/request
///
/// Issues a one-time password for the phone number, creating the account on
/// first contact. An optional invite code links the account to its inviter.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpBody>,
) -> Result<Json<RequestOtpResponse>, ApiError> {
    payload.validate()?;

    let engine = otp_engine(&state);
    engine
        .issue(&payload.phone, payload.invite.as_deref())
        .await?;

    record_otp_issued();

    Ok(Json(RequestOtpResponse {
        detail: "Verification code sent".to_string(),
        login_url: format!("/api/v1/auth/otp/verify/{}", payload.phone),
    }))
}

/// POST /api/v1/auth/otp/verify/{phone}
///
/// Validates the submitted code and establishes a session on success.
pub async fn verify_otp(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    Json(payload): Json<VerifyOtpBody>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    if !is_valid_phone(&phone) {
        return Err(ApiError::Validation(
            "Phone number must be 10 digits starting with 9".to_string(),
        ));
    }

    let engine = otp_engine(&state);
    let account = match engine.verify(&phone, payload.otp).await {
        Ok(account) => {
            record_otp_verification("success");
            account
        }
        Err(err) => {
            record_otp_verification(verification_outcome(&err));
            return Err(err.into());
        }
    };

    let profile = engine.store().find_profile_by_phone(&phone).await?;

    let token = state
        .session_keys
        .issue(&account.phone)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(VerifyOtpResponse {
        token,
        token_type: "Bearer".to_string(),
        account: summarize(account, profile),
    }))
}

fn verification_outcome(err: &AuthError) -> &'static str {
    match err {
        AuthError::OtpMismatch => "mismatch",
        AuthError::OtpExpired => "expired",
        AuthError::AttemptsExhausted => "exhausted",
        AuthError::NoPendingOtp => "no_pending",
        _ => "error",
    }
}

fn summarize(account: Account, profile: Option<domain::models::Profile>) -> AccountSummary {
    AccountSummary {
        phone: account.phone,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        invite_code: profile.as_ref().map(|p| p.invite_code.clone()),
        invited_by_code: profile.and_then(|p| p.inviter().map(String::from)),
    }
}
