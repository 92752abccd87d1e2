//! User Entity
//!
//! An account that can log in: agency clients and administrators.

use chrono::{DateTime, Utc};
use kernel::error::app_error::{AppError, AppResult};
use kernel::id::UserId;
use kernel::pagination::Searchable;
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_role::UserRole};

/// Longest accepted display name, in characters
pub const NAME_MAX_LENGTH: usize = 100;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Unique, lowercased
    pub email: Email,
    pub name: String,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(email: Email, name: String, password_hash: HashedPassword, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Trimmed, non-empty display name
    pub fn validate_name(raw: &str) -> AppResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name cannot be empty"));
        }
        if name.chars().count() > NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at most {} characters",
                NAME_MAX_LENGTH
            )));
        }
        Ok(name.to_string())
    }

    /// Update user role
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl Searchable for User {
    fn search_field(&self, column: &str) -> Option<&str> {
        match column {
            "name" => Some(&self.name),
            "email" => Some(self.email.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn hash() -> HashedPassword {
        ClearTextPassword::new("password123".to_string())
            .unwrap()
            .hash()
            .unwrap()
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(User::validate_name("  Budi  ").unwrap(), "Budi");
        assert!(User::validate_name("   ").is_err());
        assert!(User::validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_set_role_touches_updated_at() {
        let mut user = User::new(
            Email::new("a@b.co").unwrap(),
            "A".into(),
            hash(),
            UserRole::Client,
        );
        let before = user.updated_at;
        user.set_role(UserRole::Admin);
        assert!(user.is_admin());
        assert!(user.updated_at >= before);
    }
}
