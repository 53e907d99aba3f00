//! Repository for account maintenance outside the OTP flow.

use sqlx::PgPool;

/// Repository for account administration.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true iff an account with the given phone exists.
    pub async fn exists(&self, phone: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE phone = $1)")
            .bind(phone)
            .fetch_one(&self.pool)
            .await
    }

    /// Returns true iff any staff account exists.
    pub async fn staff_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE is_staff = TRUE)")
            .fetch_one(&self.pool)
            .await
    }

    /// Marks an account as staff and sets its password hash.
    ///
    /// Returns true if the account was updated.
    pub async fn grant_staff(
        &self,
        phone: &str,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_staff = TRUE, password_hash = $2, updated_at = NOW()
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
