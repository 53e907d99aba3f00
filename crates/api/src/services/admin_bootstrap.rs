//! Staff bootstrap service for initial setup.
//!
//! Creates the first staff account on startup if configured via environment
//! variables. This is a one-time operation that checks whether a staff
//! account already exists.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;
use domain::store::{ProfileStore, StoreError};
use persistence::repositories::{AccountRepository, ProfileRepository};
use shared::password::{hash_password, PasswordError};
use shared::validation::is_valid_phone;

/// Error types for staff bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Bootstrap the staff account if configured and not already done.
///
/// This function should be called after migrations on startup.
/// It is idempotent: if a staff account already exists, it does nothing.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<(), BootstrapError> {
    // Skip if not configured
    if config.bootstrap_phone.is_empty() {
        return Ok(());
    }

    if config.bootstrap_password.is_empty() {
        warn!(
            "PA__ADMIN__BOOTSTRAP_PHONE is set but PA__ADMIN__BOOTSTRAP_PASSWORD is empty - skipping bootstrap"
        );
        return Ok(());
    }

    if !is_valid_phone(&config.bootstrap_phone) {
        return Err(BootstrapError::Config(format!(
            "bootstrap phone {:?} is not a valid phone number",
            config.bootstrap_phone
        )));
    }

    let accounts = AccountRepository::new(pool.clone());
    if accounts.staff_exists().await? {
        info!("Staff account already exists - skipping bootstrap");
        return Ok(());
    }

    let profiles = ProfileRepository::new(pool.clone());
    if !accounts.exists(&config.bootstrap_phone).await? {
        profiles
            .create_account_with_profile(&config.bootstrap_phone, None)
            .await?;
    }

    let password_hash = hash_password(&config.bootstrap_password)?;
    accounts
        .grant_staff(&config.bootstrap_phone, &password_hash)
        .await?;

    info!(
        phone = %config.bootstrap_phone,
        "Bootstrap staff account created successfully"
    );

    warn!(
        "SECURITY: Remove PA__ADMIN__BOOTSTRAP_PHONE and PA__ADMIN__BOOTSTRAP_PASSWORD \
         from configuration after initial setup."
    );

    Ok(())
}
