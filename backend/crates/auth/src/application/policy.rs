//! Authorization Policy
//!
//! Every role check in the backend goes through [`authorize`].
//!
//! - Admins may do anything.
//! - Clients may read their own profile, projects, invoices and tickets,
//!   and open tickets for themselves.
//! - Public catalog reads need no subject.

use kernel::id::UserId;

use crate::domain::entity::current_user::CurrentUser;
use crate::error::{AuthError, AuthResult};

/// What is being accessed. Owned resources carry their owner when known;
/// `owner: None` means "all records", e.g. an unscoped listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Pages, templates, published posts, active pricing plans
    PublicCatalog,
    /// CMS content management (drafts included)
    Content,
    PricingPlan,
    Project { owner: Option<UserId> },
    Invoice { owner: Option<UserId> },
    Ticket { owner: Option<UserId> },
    UserAccount { id: Option<UserId> },
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

pub fn authorize(subject: Option<&CurrentUser>, resource: Resource, action: Action) -> bool {
    if resource == Resource::PublicCatalog && action == Action::Read {
        return true;
    }

    let Some(user) = subject else {
        return false;
    };

    if user.is_admin() {
        return true;
    }

    let owns = |owner: Option<UserId>| owner == Some(user.id);

    match (resource, action) {
        (Resource::Project { owner }, Action::Read)
        | (Resource::Invoice { owner }, Action::Read)
        | (Resource::Ticket { owner }, Action::Read | Action::Create) => owns(owner),
        (Resource::UserAccount { id }, Action::Read) => owns(id),
        _ => false,
    }
}

/// [`authorize`] as a result: 401 without a subject, 403 otherwise
pub fn require(subject: Option<&CurrentUser>, resource: Resource, action: Action) -> AuthResult<()> {
    if authorize(subject, resource, action) {
        return Ok(());
    }
    match subject {
        None => Err(AuthError::Unauthenticated),
        Some(user) => {
            tracing::warn!(
                user_id = %user.id,
                role = %user.role,
                ?resource,
                ?action,
                "Authorization denied"
            );
            Err(AuthError::Forbidden)
        }
    }
}
