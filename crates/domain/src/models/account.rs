//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user account, keyed by phone number.
///
/// The phone is the sole natural key and is never mutated after creation.
/// Accounts created through the OTP flow carry no password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Account {
    pub id: Uuid,
    pub phone: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of an account's mutable identity fields.
///
/// `None` leaves the field untouched. The phone is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AccountUpdate {
    /// Returns true if no field would change.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account {
            id: Uuid::new_v4(),
            phone: "9001112233".to_string(),
            password_hash: Some("secret_hash".to_string()),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_account_update_is_empty() {
        assert!(AccountUpdate::default().is_empty());
        assert!(!AccountUpdate {
            email: Some("a@b.c".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
