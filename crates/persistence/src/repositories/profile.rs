//! Repository implementing the domain profile store against PostgreSQL.
//!
//! All read-modify-write operations the engines rely on are single
//! conditional statements, so concurrent issue/validate calls on the same
//! phone serialize on the row instead of racing in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::codes;
use domain::models::{Account, AccountUpdate, OtpChallenge, Profile};
use domain::store::{ProfileStore, StoreError};

use crate::entities::{AccountEntity, OtpAttemptRow, ProfileEntity};

/// Upper bound on invite code regeneration after collisions.
const MAX_CODE_ATTEMPTS: u32 = 8;

/// PostgreSQL-backed store for accounts and profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn find_account_by_phone(&self, phone: &str) -> Result<Option<Account>, StoreError> {
        let entity = sqlx::query_as::<_, AccountEntity>(
            r#"
            SELECT id, phone, password_hash, email, first_name, last_name,
                   is_active, is_staff, created_at, updated_at
            FROM accounts
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn find_profile_by_phone(&self, phone: &str) -> Result<Option<Profile>, StoreError> {
        let entity = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT p.account_id, p.otp, p.otp_issued_at, p.otp_attempts_remaining,
                   p.invite_code, p.invited_by_code, p.created_at
            FROM profiles p
            JOIN accounts a ON a.id = p.account_id
            WHERE a.phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity.map(Into::into))
    }

    /// Creates the account and its profile in one transaction.
    ///
    /// The invite code is generated here and re-rolled on collision;
    /// `ON CONFLICT (invite_code) DO NOTHING` turns a lost uniqueness race
    /// into a retry instead of an error.
    async fn create_account_with_profile(
        &self,
        phone: &str,
        invited_by: Option<&str>,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let account_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (phone)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(phone)
        .fetch_one(&mut *tx)
        .await?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = codes::new_invite_code();
            let entity = sqlx::query_as::<_, ProfileEntity>(
                r#"
                INSERT INTO profiles (account_id, invite_code, invited_by_code)
                VALUES ($1, $2, $3)
                ON CONFLICT (invite_code) DO NOTHING
                RETURNING account_id, otp, otp_issued_at, otp_attempts_remaining,
                          invite_code, invited_by_code, created_at
                "#,
            )
            .bind(account_id)
            .bind(&candidate)
            .bind(invited_by)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(entity) = entity {
                tx.commit().await?;
                return Ok(entity.into());
            }
        }

        // Rolls back on drop; with a 36^6 code space this means the
        // generator is broken, not that we are unlucky.
        Err(StoreError::InviteCodeCollision)
    }

    async fn invite_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE invite_code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn set_invited_by(&self, account_id: Uuid, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET invited_by_code = $2
            WHERE account_id = $1
              AND (invited_by_code IS NULL OR invited_by_code = '')
            "#,
        )
        .bind(account_id)
        .bind(code)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin_challenge(
        &self,
        account_id: Uuid,
        otp: i32,
        issued_at: DateTime<Utc>,
        attempts: i32,
        reissue_cutoff: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Rate-limit check and write in one statement: two concurrent
        // issuances cannot both see a stale otp_issued_at.
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET otp = $2, otp_issued_at = $3, otp_attempts_remaining = $4
            WHERE account_id = $1
              AND (otp_issued_at IS NULL OR otp_issued_at <= $5)
            "#,
        )
        .bind(account_id)
        .bind(otp)
        .bind(issued_at)
        .bind(attempts)
        .bind(reissue_cutoff)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn consume_attempt(
        &self,
        account_id: Uuid,
    ) -> Result<Option<OtpChallenge>, StoreError> {
        // Decrement-and-read in one statement so two concurrent guesses
        // cannot both spend the same remaining attempt.
        let row = sqlx::query_as::<_, OtpAttemptRow>(
            r#"
            UPDATE profiles
            SET otp_attempts_remaining = COALESCE(otp_attempts_remaining, 0) - 1
            WHERE account_id = $1
              AND otp IS NOT NULL
              AND otp_issued_at IS NOT NULL
            RETURNING otp, otp_issued_at, otp_attempts_remaining
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_followers(&self, invite_code: &str) -> Result<Vec<String>, StoreError> {
        let phones: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT a.phone
            FROM profiles p
            JOIN accounts a ON a.id = p.account_id
            WHERE p.invited_by_code = $1
            ORDER BY p.id
            "#,
        )
        .bind(invite_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(phones)
    }

    async fn update_account(
        &self,
        phone: &str,
        update: &AccountUpdate,
    ) -> Result<Option<Account>, StoreError> {
        let entity = sqlx::query_as::<_, AccountEntity>(
            r#"
            UPDATE accounts
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                updated_at = NOW()
            WHERE phone = $1
            RETURNING id, phone, password_hash, email, first_name, last_name,
                      is_active, is_staff, created_at, updated_at
            "#,
        )
        .bind(phone)
        .bind(update.email.as_deref())
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity.map(Into::into))
    }
}
