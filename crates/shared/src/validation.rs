//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Length of a profile invite code.
pub const INVITE_CODE_LEN: usize = 6;

lazy_static! {
    /// Russian mobile number without country code: 10 digits starting with 9.
    static ref PHONE_REGEX: Regex = Regex::new(r"^9\d{9}$").unwrap();

    /// Invite codes are 6 lowercase alphanumeric characters.
    static ref INVITE_CODE_REGEX: Regex = Regex::new(r"^[a-z0-9]{6}$").unwrap();
}

/// Validates a phone number: exactly 10 digits, starting with 9
/// (a Russian mobile number without the country code).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message =
            Some("Phone must be 10 digits starting with 9, e.g. 9001112233".into());
        Err(err)
    }
}

/// Validates an invite code: 6 lowercase letters or digits.
///
/// An empty string is accepted, since "no invite" is expressed either as
/// a missing field or an empty one by existing clients.
pub fn validate_invite_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || INVITE_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invite_code_format");
        err.message = Some("Invite code must be 6 lowercase letters or digits".into());
        Err(err)
    }
}

/// Returns true if the phone string is well formed.
pub fn is_valid_phone(phone: &str) -> bool {
    validate_phone(phone).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_accepts_russian_mobile() {
        assert!(validate_phone("9001112233").is_ok());
        assert!(validate_phone("9999999999").is_ok());
        assert!(validate_phone("9005556677").is_ok());
    }

    #[test]
    fn test_validate_phone_rejects_wrong_prefix() {
        assert!(validate_phone("8001112233").is_err());
        assert!(validate_phone("0001112233").is_err());
    }

    #[test]
    fn test_validate_phone_rejects_wrong_length() {
        assert!(validate_phone("900111223").is_err());
        assert!(validate_phone("90011122334").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_phone_rejects_country_code_and_symbols() {
        assert!(validate_phone("+79001112233").is_err());
        assert!(validate_phone("79001112233").is_err());
        assert!(validate_phone("900-111-22-33").is_err());
        assert!(validate_phone("90011122зз").is_err());
    }

    #[test]
    fn test_validate_invite_code_accepts_lowercase_alphanumeric() {
        assert!(validate_invite_code("ab12cd").is_ok());
        assert!(validate_invite_code("aaaaaa").is_ok());
        assert!(validate_invite_code("123456").is_ok());
    }

    #[test]
    fn test_validate_invite_code_accepts_empty() {
        assert!(validate_invite_code("").is_ok());
    }

    #[test]
    fn test_validate_invite_code_rejects_bad_format() {
        assert!(validate_invite_code("AB12CD").is_err());
        assert!(validate_invite_code("ab12c").is_err());
        assert!(validate_invite_code("ab12cde").is_err());
        assert!(validate_invite_code("ab 2cd").is_err());
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("9001112233"));
        assert!(!is_valid_phone("1234567890"));
    }
}
