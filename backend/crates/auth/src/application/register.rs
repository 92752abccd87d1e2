//! Register Use Case
//!
//! Creates client accounts, and the bootstrap administrator on startup.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Register a new client
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        self.create(input, UserRole::Client).await
    }

    /// Make sure an admin with `email` exists, promoting an existing account
    /// if needed. The password is only used when the account is created.
    pub async fn ensure_admin(&self, email: &str, password: String) -> AuthResult<User> {
        let email_vo = Email::new(email)?;
        if let Some(existing) = self.repo.find_by_email(&email_vo).await? {
            if existing.is_admin() {
                return Ok(existing);
            }
            tracing::info!(user_id = %existing.id, "Promoting bootstrap account to admin");
            return self
                .repo
                .update_role(existing.id, UserRole::Admin)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        let input = RegisterInput {
            email: email.to_string(),
            name: "Administrator".to_string(),
            password,
        };
        self.create(input, UserRole::Admin).await
    }

    async fn create(&self, input: RegisterInput, role: UserRole) -> AuthResult<User> {
        let email = Email::new(input.email)?;
        let name = User::validate_name(&input.name)?;
        let password = ClearTextPassword::new(input.password).map_err(|e| AuthError::App(e.into()))?;

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let user = User::new(email, name, hash, role);
        self.repo.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(user)
    }
}
