//! In-memory user repository for tests and local development

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::UserId;
use kernel::pagination::ListParams;
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All users, unordered
    pub async fn snapshot(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn list(&self, params: &ListParams) -> AuthResult<(Vec<User>, u64)> {
        let mut users: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| params.search.as_ref().is_none_or(|s| s.matches(*u)))
            .cloned()
            .collect();

        users.sort_by(|a, b| {
            let ordering = match params.sort.column {
                "name" => a.name.cmp(&b.name),
                "email" => a.email.as_str().cmp(b.email.as_str()),
                _ => a.created_at.cmp(&b.created_at),
            };
            params.sort_order.apply(ordering.then_with(|| a.id.as_uuid().cmp(b.id.as_uuid())))
        });

        Ok(params.slice(users))
    }

    async fn update_role(&self, id: UserId, role: UserRole) -> AuthResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> AuthResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn count(&self, role: Option<UserRole>) -> AuthResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .count() as u64)
    }
}
