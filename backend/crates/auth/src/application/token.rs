//! Session Tokens
//!
//! HS256 JWTs carrying the user id, email and role. Stateless: nothing is
//! stored server-side, expiry is the only revocation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{current_user::CurrentUser, user::User};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn into_current_user(self) -> AuthResult<CurrentUser> {
        let id: UserId = self.sub.parse().map_err(|_| AuthError::TokenInvalid)?;
        Ok(CurrentUser {
            id,
            email: self.email,
            role: self.role,
        })
    }
}

/// Sign a token for `user` valid for `ttl` from now
pub fn issue_token(user: &User, secret: &str, ttl: Duration) -> AuthResult<String> {
    issue_token_at(user, secret, ttl, Utc::now())
}

/// Sign a token as if issued at `issued_at`
pub fn issue_token_at(
    user: &User,
    secret: &str,
    ttl: Duration,
    issued_at: DateTime<Utc>,
) -> AuthResult<String> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| AuthError::Internal(format!("token ttl out of range: {e}")))?;
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.as_str().to_string(),
        role: user.role,
        iat: issued_at.timestamp(),
        exp: (issued_at + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to encode session token");
        AuthError::Internal("failed to sign session token".to_string())
    })
}

/// Verify signature and expiry; no leeway
pub fn verify_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            }
        })
}
