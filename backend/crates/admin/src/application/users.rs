//! User administration

use std::sync::Arc;

use auth::{Action, AuthError, CurrentUser, Resource, User, UserRepository, UserRole, require};
use kernel::id::UserId;
use kernel::pagination::ListParams;

use crate::error::AdminResult;

pub struct UserAdminService<U>
where
    U: UserRepository,
{
    users: Arc<U>,
}

impl<U> UserAdminService<U>
where
    U: UserRepository,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    pub async fn list(
        &self,
        actor: &CurrentUser,
        params: &ListParams,
    ) -> AdminResult<(Vec<User>, u64)> {
        require(Some(actor), Resource::UserAccount { id: None }, Action::Read)?;
        Ok(self.users.list(params).await?)
    }

    pub async fn update_role(
        &self,
        actor: &CurrentUser,
        id: UserId,
        role: UserRole,
    ) -> AdminResult<User> {
        require(Some(actor), Resource::UserAccount { id: Some(id) }, Action::Update)?;
        let user = self
            .users
            .update_role(id, role)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        tracing::info!(actor = %actor.id, user_id = %id, %role, "User role changed");
        Ok(user)
    }

    pub async fn delete(&self, actor: &CurrentUser, id: UserId) -> AdminResult<()> {
        require(Some(actor), Resource::UserAccount { id: Some(id) }, Action::Delete)?;
        if actor.id == id {
            return Err(AuthError::CannotDeleteSelf.into());
        }
        if !self.users.delete(id).await? {
            return Err(AuthError::UserNotFound.into());
        }
        tracing::info!(actor = %actor.id, user_id = %id, "User deleted");
        Ok(())
    }
}
