//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::config::AppConfig;
use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime; also the auth cookie Max-Age
    pub token_ttl: Duration,
    /// HttpOnly cookie carrying the session token
    pub auth_cookie_name: String,
    /// Script-readable cookie carrying the CSRF token
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Path prefixes where cookie-authenticated mutations need a CSRF token
    pub csrf_protected_prefixes: Vec<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("auth_cookie_name", &self.auth_cookie_name)
            .field("csrf_cookie_name", &self.csrf_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("csrf_protected_prefixes", &self.csrf_protected_prefixes)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl: Duration::from_secs(24 * 3600),
            auth_cookie_name: "auth_token".to_string(),
            csrf_cookie_name: "csrf_token".to_string(),
            csrf_header_name: "x-csrf-token".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            csrf_protected_prefixes: vec![
                "/api/admin".to_string(),
                "/api/portal".to_string(),
                "/api/auth/logout".to_string(),
            ],
        }
    }
}

impl AuthConfig {
    pub fn from_app_config(app: &AppConfig) -> Self {
        Self {
            jwt_secret: app.jwt_secret.clone(),
            token_ttl: app.jwt_expires,
            cookie_secure: app.cookie_secure,
            ..Self::default()
        }
    }

    /// Config for development and tests (fixed secret, insecure cookie)
    pub fn development() -> Self {
        Self {
            jwt_secret: "development-secret-do-not-use-in-prod".to_string(),
            cookie_secure: false,
            ..Self::default()
        }
    }

    pub fn auth_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.auth_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_ttl.as_secs()),
        }
    }

    /// Readable by frontend scripts so they can echo it in the header
    pub fn csrf_cookie(&self) -> CookieConfig {
        CookieConfig {
            http_only: false,
            name: self.csrf_cookie_name.clone(),
            ..self.auth_cookie()
        }
    }
}
