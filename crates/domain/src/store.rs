//! Profile store abstraction.
//!
//! The engines never touch a database directly; they operate on this trait.
//! Implementations must make the documented read-modify-write operations
//! atomic per profile, so concurrent issue/validate calls on the same phone
//! cannot interleave (see the repository implementation in the persistence
//! crate).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, AccountUpdate, OtpChallenge, Profile};

/// Errors surfaced by a profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invite code generation kept colliding with existing codes.
    #[error("Could not generate a unique invite code")]
    InviteCodeCollision,
}

/// Storage interface for accounts and their profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Looks up an account by phone.
    async fn find_account_by_phone(&self, phone: &str) -> Result<Option<Account>, StoreError>;

    /// Looks up a profile by the owning account's phone.
    async fn find_profile_by_phone(&self, phone: &str) -> Result<Option<Profile>, StoreError>;

    /// Creates an account and its profile atomically.
    ///
    /// A fresh unique invite code is generated inside the same transaction,
    /// retrying on collision. `invited_by` is recorded as-is; the caller has
    /// already established that it resolves to an existing profile.
    async fn create_account_with_profile(
        &self,
        phone: &str,
        invited_by: Option<&str>,
    ) -> Result<Profile, StoreError>;

    /// Returns true iff some profile owns the given invite code.
    async fn invite_code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Records the inviter code, first-write-wins.
    ///
    /// Returns false if `invited_by_code` was already set (including a
    /// concurrent writer winning the race).
    async fn set_invited_by(&self, account_id: Uuid, code: &str) -> Result<bool, StoreError>;

    /// Persists a fresh OTP challenge unless one was issued after
    /// `reissue_cutoff`.
    ///
    /// The rate-limit check and the write are a single atomic operation;
    /// returns false (stored OTP untouched) when the check fails.
    async fn begin_challenge(
        &self,
        account_id: Uuid,
        otp: i32,
        issued_at: DateTime<Utc>,
        attempts: i32,
        reissue_cutoff: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Atomically spends one validation attempt on the pending OTP.
    ///
    /// Returns the challenge state after the decrement, or `None` when no
    /// OTP is pending. The decrement is persisted regardless of what the
    /// caller concludes about expiry or the submitted code.
    async fn consume_attempt(
        &self,
        account_id: Uuid,
    ) -> Result<Option<OtpChallenge>, StoreError>;

    /// Phones of all accounts whose profile was invited by the given code,
    /// in profile creation order.
    async fn list_followers(&self, invite_code: &str) -> Result<Vec<String>, StoreError>;

    /// Applies a partial update to an account's identity fields.
    async fn update_account(
        &self,
        phone: &str,
        update: &AccountUpdate,
    ) -> Result<Option<Account>, StoreError>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store double for engine tests.

    use std::sync::Mutex;

    use super::*;
    use crate::codes;

    struct Row {
        account: Account,
        profile: Profile,
    }

    /// Mutex-backed store; rows keep insertion order for follower listing.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        rows: Mutex<Vec<Row>>,
    }

    impl MemoryStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Test hook: clone the profile for a phone.
        pub(crate) fn profile(&self, phone: &str) -> Option<Profile> {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .find(|r| r.account.phone == phone)
                .map(|r| r.profile.clone())
        }

        /// Test hook: shift the pending OTP's issue time into the past.
        pub(crate) fn backdate_otp(&self, phone: &str, secs: i64) {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.account.phone == phone)
                .expect("no such phone");
            row.profile.otp_issued_at = row
                .profile
                .otp_issued_at
                .map(|t| t - chrono::Duration::seconds(secs));
        }
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn find_account_by_phone(
            &self,
            phone: &str,
        ) -> Result<Option<Account>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|r| r.account.phone == phone)
                .map(|r| r.account.clone()))
        }

        async fn find_profile_by_phone(
            &self,
            phone: &str,
        ) -> Result<Option<Profile>, StoreError> {
            Ok(self.profile(phone))
        }

        async fn create_account_with_profile(
            &self,
            phone: &str,
            invited_by: Option<&str>,
        ) -> Result<Profile, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let invite_code = loop {
                let candidate = codes::new_invite_code();
                if !rows.iter().any(|r| r.profile.invite_code == candidate) {
                    break candidate;
                }
            };
            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4(),
                phone: phone.to_string(),
                password_hash: None,
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                is_active: true,
                is_staff: false,
                created_at: now,
                updated_at: now,
            };
            let profile = Profile {
                account_id: account.id,
                otp: None,
                otp_issued_at: None,
                otp_attempts_remaining: None,
                invite_code,
                invited_by_code: invited_by.map(String::from),
                created_at: now,
            };
            rows.push(Row {
                account,
                profile: profile.clone(),
            });
            Ok(profile)
        }

        async fn invite_code_exists(&self, code: &str) -> Result<bool, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|r| r.profile.invite_code == code))
        }

        async fn set_invited_by(
            &self,
            account_id: Uuid,
            code: &str,
        ) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| r.account.id == account_id) else {
                return Ok(false);
            };
            if row.profile.inviter().is_some() {
                return Ok(false);
            }
            row.profile.invited_by_code = Some(code.to_string());
            Ok(true)
        }

        async fn begin_challenge(
            &self,
            account_id: Uuid,
            otp: i32,
            issued_at: DateTime<Utc>,
            attempts: i32,
            reissue_cutoff: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| r.account.id == account_id) else {
                return Ok(false);
            };
            if row
                .profile
                .otp_issued_at
                .is_some_and(|t| t > reissue_cutoff)
            {
                return Ok(false);
            }
            row.profile.otp = Some(otp);
            row.profile.otp_issued_at = Some(issued_at);
            row.profile.otp_attempts_remaining = Some(attempts);
            Ok(true)
        }

        async fn consume_attempt(
            &self,
            account_id: Uuid,
        ) -> Result<Option<OtpChallenge>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| r.account.id == account_id) else {
                return Ok(None);
            };
            let (Some(otp), Some(issued_at)) = (row.profile.otp, row.profile.otp_issued_at)
            else {
                return Ok(None);
            };
            let remaining = row.profile.otp_attempts_remaining.unwrap_or(0) - 1;
            row.profile.otp_attempts_remaining = Some(remaining);
            Ok(Some(OtpChallenge {
                otp,
                issued_at,
                attempts_remaining: remaining,
            }))
        }

        async fn list_followers(&self, invite_code: &str) -> Result<Vec<String>, StoreError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.profile.inviter() == Some(invite_code))
                .map(|r| r.account.phone.clone())
                .collect())
        }

        async fn update_account(
            &self,
            phone: &str,
            update: &AccountUpdate,
        ) -> Result<Option<Account>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let Some(row) = rows.iter_mut().find(|r| r.account.phone == phone) else {
                return Ok(None);
            };
            if let Some(email) = &update.email {
                row.account.email = email.clone();
            }
            if let Some(first_name) = &update.first_name {
                row.account.first_name = first_name.clone();
            }
            if let Some(last_name) = &update.last_name {
                row.account.last_name = last_name.clone();
            }
            row.account.updated_at = Utc::now();
            Ok(Some(row.account.clone()))
        }
    }
}
