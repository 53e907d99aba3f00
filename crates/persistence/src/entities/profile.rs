//! Profile entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::OtpChallenge;

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub account_id: Uuid,
    pub otp: Option<i32>,
    pub otp_issued_at: Option<DateTime<Utc>>,
    pub otp_attempts_remaining: Option<i32>,
    pub invite_code: String,
    pub invited_by_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileEntity> for domain::models::Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            account_id: entity.account_id,
            otp: entity.otp,
            otp_issued_at: entity.otp_issued_at,
            otp_attempts_remaining: entity.otp_attempts_remaining,
            invite_code: entity.invite_code,
            invited_by_code: entity.invited_by_code,
            created_at: entity.created_at,
        }
    }
}

/// Row returned by the attempt-consuming UPDATE on a pending OTP.
#[derive(Debug, Clone, FromRow)]
pub struct OtpAttemptRow {
    pub otp: i32,
    pub otp_issued_at: DateTime<Utc>,
    pub otp_attempts_remaining: i32,
}

impl From<OtpAttemptRow> for OtpChallenge {
    fn from(row: OtpAttemptRow) -> Self {
        Self {
            otp: row.otp,
            issued_at: row.otp_issued_at,
            attempts_remaining: row.otp_attempts_remaining,
        }
    }
}
