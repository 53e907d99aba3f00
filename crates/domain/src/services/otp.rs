//! OTP lifecycle engine.
//!
//! Issues one-time passwords with a reissue rate limit and validates them
//! against a lifetime and a bounded attempt count. Each profile holds at
//! most one pending OTP; issuing a new one silently supersedes the old
//! value in storage.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::codes;
use crate::error::AuthError;
use crate::models::Account;
use crate::services::delivery::OtpSender;
use crate::store::ProfileStore;

/// OTP policy knobs.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Minimum seconds between two issuances for the same profile.
    pub retry_timeout_secs: i64,
    /// Seconds a pending OTP stays valid.
    pub lifetime_secs: i64,
    /// Validation attempts granted per issuance.
    pub attempts: i32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            retry_timeout_secs: 60,
            lifetime_secs: 300,
            attempts: 3,
        }
    }
}

/// Issues and validates one-time passwords against a [`ProfileStore`].
pub struct OtpEngine<S> {
    store: S,
    config: OtpConfig,
    sender: Arc<dyn OtpSender>,
}

impl<S: ProfileStore> OtpEngine<S> {
    pub fn new(store: S, config: OtpConfig, sender: Arc<dyn OtpSender>) -> Self {
        Self {
            store,
            config,
            sender,
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Issues a fresh OTP for the phone, creating the account on first
    /// contact.
    ///
    /// For a new phone the invite code, when present, must resolve to an
    /// existing profile. For an existing profile a valid invite code is
    /// recorded first-write-wins; an invalid or self-referencing one is
    /// ignored.
    pub async fn issue(&self, phone: &str, invite: Option<&str>) -> Result<(), AuthError> {
        let invite = invite.filter(|c| !c.is_empty());

        // Existing profiles record a requested invite only after the rate
        // limit passes; a rejected reissue leaves the inviter untouched.
        let (profile, attach_invite) = match self.store.find_profile_by_phone(phone).await? {
            Some(profile) => (profile, true),
            None => {
                if let Some(code) = invite {
                    if !self.store.invite_code_exists(code).await? {
                        return Err(AuthError::InvalidInviteCode);
                    }
                }
                let profile = self.store.create_account_with_profile(phone, invite).await?;
                (profile, false)
            }
        };

        let otp = codes::new_otp();
        let now = Utc::now();
        let cutoff = now - Duration::seconds(self.config.retry_timeout_secs);
        let issued = self
            .store
            .begin_challenge(profile.account_id, otp, now, self.config.attempts, cutoff)
            .await?;
        if !issued {
            return Err(AuthError::RetryTooSoon);
        }

        if attach_invite {
            if let Some(code) = invite {
                if profile.inviter().is_none()
                    && code != profile.invite_code
                    && self.store.invite_code_exists(code).await?
                {
                    // First-write-wins: an invalid or own code is ignored,
                    // and losing the conditional write to a concurrent
                    // attacher is not an error here.
                    self.store.set_invited_by(profile.account_id, code).await?;
                }
            }
        }

        debug!(phone, "OTP issued");

        // Fire-and-forget delivery: a failed send never revokes the code.
        if let Err(err) = self.sender.send_otp(phone, otp).await {
            warn!(phone, error = %err, "OTP delivery failed");
        }

        Ok(())
    }

    /// Validates a submitted code against the pending OTP.
    ///
    /// One attempt is spent and persisted before expiry and match are
    /// evaluated, so even a check against an expired code consumes an
    /// attempt. On success the account is returned so the caller can
    /// establish a session; the OTP fields are left to be overwritten by
    /// the next issuance.
    pub async fn verify(&self, phone: &str, submitted: i32) -> Result<Account, AuthError> {
        let profile = self
            .store
            .find_profile_by_phone(phone)
            .await?
            .ok_or(AuthError::NoPendingOtp)?;

        let challenge = self
            .store
            .consume_attempt(profile.account_id)
            .await?
            .ok_or(AuthError::NoPendingOtp)?;

        let elapsed = Utc::now() - challenge.issued_at;
        if elapsed.num_seconds() >= self.config.lifetime_secs {
            return Err(AuthError::OtpExpired);
        }
        if challenge.attempts_remaining <= 0 {
            return Err(AuthError::AttemptsExhausted);
        }
        if challenge.otp != submitted {
            return Err(AuthError::OtpMismatch);
        }

        self.store
            .find_account_by_phone(phone)
            .await?
            .ok_or(AuthError::NoPendingOtp)
    }
}
