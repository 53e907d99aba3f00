//! Random code generation for invite codes and one-time passwords.
//!
//! Neither generator is cryptographic. Invite codes are human-shareable
//! identifiers whose uniqueness is enforced by the store; OTPs are protected
//! by a short lifetime and a bounded attempt count.

use rand::Rng;

use shared::validation::INVITE_CODE_LEN;

/// Inclusive lower bound of the OTP range.
pub const OTP_MIN: i32 = 999;

/// Inclusive upper bound of the OTP range.
pub const OTP_MAX: i32 = 9999;

/// Generates a 6-character invite code of lowercase letters and digits.
///
/// Each position is a digit with probability 1/3, a lowercase letter
/// otherwise. The caller must check the result for uniqueness and
/// regenerate on collision.
pub fn new_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| {
            if rng.gen_range(0..3) == 0 {
                (b'0' + rng.gen_range(0..10u8)) as char
            } else {
                (b'a' + rng.gen_range(0..26u8)) as char
            }
        })
        .collect()
}

/// Generates a one-time password, uniform in `OTP_MIN..=OTP_MAX`.
pub fn new_otp() -> i32 {
    rand::thread_rng().gen_range(OTP_MIN..=OTP_MAX)
}
