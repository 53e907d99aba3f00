//! Account entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the accounts table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub phone: String,
    pub password_hash: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountEntity> for domain::models::Account {
    fn from(entity: AccountEntity) -> Self {
        Self {
            id: entity.id,
            phone: entity.phone,
            password_hash: entity.password_hash,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
            is_active: entity.is_active,
            is_staff: entity.is_staff,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_entity_conversion() {
        let now = Utc::now();
        let entity = AccountEntity {
            id: Uuid::new_v4(),
            phone: "9001112233".to_string(),
            password_hash: None,
            email: "user@example.com".to_string(),
            first_name: "Ivan".to_string(),
            last_name: String::new(),
            is_active: true,
            is_staff: false,
            created_at: now,
            updated_at: now,
        };
        let account: domain::models::Account = entity.clone().into();
        assert_eq!(account.id, entity.id);
        assert_eq!(account.phone, "9001112233");
        assert_eq!(account.email, "user@example.com");
        assert!(account.is_active);
        assert!(!account.is_staff);
    }
}
