//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;
use kernel::pagination::ListParams;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. Fails with `EmailTaken` on a duplicate email.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// One page of users plus the total matching count
    async fn list(&self, params: &ListParams) -> AuthResult<(Vec<User>, u64)>;

    /// Change a user's role. `None` if the user does not exist.
    async fn update_role(&self, id: UserId, role: UserRole) -> AuthResult<Option<User>>;

    /// Delete a user. `false` if the user did not exist.
    async fn delete(&self, id: UserId) -> AuthResult<bool>;

    /// Count users, optionally restricted to one role
    async fn count(&self, role: Option<UserRole>) -> AuthResult<u64>;
}
