//! Out-of-band OTP delivery collaborator.

use async_trait::async_trait;
use thiserror::Error;

/// Error type for OTP delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("OTP delivery failed: {0}")]
    Failed(String),
}

/// Delivers one-time passwords to the end user (SMS, voice, console).
///
/// Delivery is fire-and-forget from the engine's perspective: a failure is
/// logged by the caller and never rolls back an issued OTP.
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_otp(&self, phone: &str, otp: i32) -> Result<(), DeliveryError>;
}
