//! Profile endpoints: registration, viewing, and updates.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_account_registered, record_invite_attached};
use crate::middleware::SessionAuth;
use domain::models::{Account, AccountUpdate, Profile};
use domain::services::InviteEngine;
use domain::store::ProfileStore;
use persistence::repositories::ProfileRepository;

/// Request body for explicit registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,

    #[validate(custom(function = "shared::validation::validate_invite_code"))]
    pub invite: Option<String>,
}

/// Request body for profile updates.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileBody {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(max = 150, message = "First name too long"))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name too long"))]
    pub last_name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_invite_code"))]
    pub invite: Option<String>,
}

/// Full profile view.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub phone: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub invite_code: String,
    pub invited_by_code: Option<String>,
    pub followers: Vec<String>,
}

fn view(account: Account, profile: Profile, followers: Vec<String>) -> ProfileView {
    ProfileView {
        phone: account.phone,
        email: account.email,
        first_name: account.first_name,
        last_name: account.last_name,
        is_staff: account.is_staff,
        invite_code: profile.invite_code.clone(),
        invited_by_code: profile.inviter().map(String::from),
        followers,
    }
}

async fn load_profile_view(
    repo: &ProfileRepository,
    phone: &str,
) -> Result<ProfileView, ApiError> {
    let account = repo
        .find_account_by_phone(phone)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;
    let profile = repo
        .find_profile_by_phone(phone)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
    let followers = repo.list_followers(&profile.invite_code).await?;
    Ok(view(account, profile, followers))
}

/// PUT /api/v1/profile
///
/// Registers an account without issuing an OTP. The phone must be unused;
/// the invite code, when given, must belong to an existing profile.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBody>,
) -> Result<(StatusCode, Json<ProfileView>), ApiError> {
    payload.validate()?;

    let repo = ProfileRepository::new(state.pool.clone());

    if repo.find_account_by_phone(&payload.phone).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this phone already exists".to_string(),
        ));
    }

    let invite = payload.invite.as_deref().filter(|c| !c.is_empty());
    if let Some(code) = invite {
        if !repo.invite_code_exists(code).await? {
            return Err(ApiError::NotFound("Unknown invite code".to_string()));
        }
    }

    repo.create_account_with_profile(&payload.phone, invite)
        .await?;
    record_account_registered();

    let view = load_profile_view(&repo, &payload.phone).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/v1/profile
///
/// Returns the authenticated account's profile, including the phones it
/// has invited, in the order they registered.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<SessionAuth>,
) -> Result<Json<ProfileView>, ApiError> {
    let repo = ProfileRepository::new(state.pool.clone());
    let view = load_profile_view(&repo, &auth.phone).await?;
    Ok(Json(view))
}

/// PATCH /api/v1/profile
///
/// Updates identity fields and optionally attaches an invite code. The
/// phone number is never mutated.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<SessionAuth>,
    Json(payload): Json<UpdateProfileBody>,
) -> Result<Json<ProfileView>, ApiError> {
    payload.validate()?;

    let repo = ProfileRepository::new(state.pool.clone());

    if let Some(code) = payload.invite.as_deref().filter(|c| !c.is_empty()) {
        let profile = repo
            .find_profile_by_phone(&auth.phone)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
        let invites = InviteEngine::new(ProfileRepository::new(state.pool.clone()));
        invites.attach(&profile, code).await?;
        record_invite_attached();
    }

    let update = AccountUpdate {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };
    if !update.is_empty() {
        repo.update_account(&auth.phone, &update)
            .await?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;
    }

    let view = load_profile_view(&repo, &auth.phone).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_body_validation() {
        let valid = RegisterBody {
            phone: "9001112233".to_string(),
            invite: None,
        };
        assert!(valid.validate().is_ok());

        let bad = RegisterBody {
            phone: "0001112233".to_string(),
            invite: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_body_validation() {
        let valid = UpdateProfileBody {
            email: Some("user@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: None,
            invite: Some("abc123".to_string()),
        };
        assert!(valid.validate().is_ok());

        let bad_email = UpdateProfileBody {
            email: Some("not-an-email".to_string()),
            first_name: None,
            last_name: None,
            invite: None,
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_view_exposes_inviter_only_when_set() {
        let account = Account {
            id: uuid::Uuid::new_v4(),
            phone: "9001112233".to_string(),
            password_hash: None,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let profile = Profile {
            account_id: account.id,
            otp: None,
            otp_issued_at: None,
            otp_attempts_remaining: None,
            invite_code: "abc123".to_string(),
            invited_by_code: Some(String::new()),
            created_at: chrono::Utc::now(),
        };
        let view = view(account, profile, vec![]);
        // An empty stored code means "never invited".
        assert!(view.invited_by_code.is_none());
        assert_eq!(view.invite_code, "abc123");
    }
}
