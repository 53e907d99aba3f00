//! Profile domain model: per-account OTP state and invite-graph state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-to-one companion of an [`super::Account`], created atomically with it.
///
/// The OTP fields describe at most one pending challenge; issuing a new OTP
/// silently supersedes the previous values. `invite_code` is immutable and
/// globally unique; `invited_by_code` is written at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub account_id: Uuid,
    #[serde(skip_serializing)] // The pending code never leaves the core
    pub otp: Option<i32>,
    pub otp_issued_at: Option<DateTime<Utc>>,
    pub otp_attempts_remaining: Option<i32>,
    pub invite_code: String,
    pub invited_by_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Returns the recorded inviter code, treating an empty string as unset.
    pub fn inviter(&self) -> Option<&str> {
        self.invited_by_code.as_deref().filter(|c| !c.is_empty())
    }
}

/// Snapshot of the pending OTP after an attempt has been spent.
///
/// `attempts_remaining` is the value *after* the decrement.
#[derive(Debug, Clone, Copy)]
pub struct OtpChallenge {
    pub otp: i32,
    pub issued_at: DateTime<Utc>,
    pub attempts_remaining: i32,
}
