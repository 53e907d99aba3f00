//! Domain error taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Errors produced by the OTP and invite engines.
///
/// Every variant except `Storage` is recoverable by retrying the
/// corresponding operation; the HTTP layer maps them to status codes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The requested invite code resolves to no profile.
    #[error("Invite code does not exist")]
    InvalidInviteCode,

    /// A profile tried to attach its own invite code.
    #[error("A profile cannot be invited by its own code")]
    SelfInvite,

    /// The profile already has a different inviter recorded.
    #[error("Profile already has an inviter")]
    AlreadyInvited,

    /// A previous OTP was issued too recently.
    #[error("An OTP was issued recently, retry later")]
    RetryTooSoon,

    /// No OTP is pending for this phone.
    #[error("No pending OTP for this phone")]
    NoPendingOtp,

    /// The pending OTP's lifetime has elapsed.
    #[error("OTP has expired")]
    OtpExpired,

    /// All validation attempts for the pending OTP were spent.
    #[error("OTP attempts exhausted")]
    AttemptsExhausted,

    /// The submitted code does not match the pending OTP.
    #[error("Incorrect OTP")]
    OtpMismatch,

    /// The profile store failed.
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_do_not_leak_internals() {
        // Messages are returned to API clients verbatim.
        assert_eq!(AuthError::OtpMismatch.to_string(), "Incorrect OTP");
        assert_eq!(
            AuthError::RetryTooSoon.to_string(),
            "An OTP was issued recently, retry later"
        );
    }
}
