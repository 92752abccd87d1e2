//! Environment Configuration
//!
//! Reads process environment (plus `.env` when present) into a validated
//! [`AppConfig`]. Validation goes through [`AppConfig::from_lookup`] so tests
//! can feed a map instead of mutating the process environment.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::client::TrustedProxies;
use crate::rate_limit::RateLimitConfig;

/// Minimum accepted length of `JWT_SECRET`, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_EXPIRES_SECS: u64 = 86_400;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_RATE_LIMIT_MAX: u32 = 5;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials used to create the first admin account on startup
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Process-wide configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expires: Duration,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub cookie_secure: bool,
    /// Limit applied to login and registration
    pub rate_limit: RateLimitConfig,
    /// Reverse proxies allowed to set `X-Forwarded-For`; empty trusts none
    pub trusted_proxies: TrustedProxies,
    pub admin_bootstrap: Option<AdminBootstrap>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expires", &self.jwt_expires)
            .field("port", &self.port)
            .field("frontend_origins", &self.frontend_origins)
            .field("cookie_secure", &self.cookie_secure)
            .field("rate_limit", &self.rate_limit)
            .field("trusted_proxies", &self.trusted_proxies)
            .field("admin_bootstrap", &self.admin_bootstrap)
            .finish()
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if it exists
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://"))
        {
            return Err(ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: "must start with postgres:// or postgresql://".to_string(),
            });
        }

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: format!("must be at least {MIN_JWT_SECRET_LEN} bytes"),
            });
        }

        let jwt_expires_secs = parse_or("JWT_EXPIRES_SECS", get("JWT_EXPIRES_SECS"), DEFAULT_JWT_EXPIRES_SECS)?;
        if jwt_expires_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_DB_MAX_CONNECTIONS,
        )?;

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(raw) => parse_bool("COOKIE_SECURE", &raw)?,
            None => true,
        };

        let frontend_origins = get("FRONTEND_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:4321".to_string()]);

        let max_requests = parse_or(
            "RATE_LIMIT_MAX_REQUESTS",
            get("RATE_LIMIT_MAX_REQUESTS"),
            DEFAULT_RATE_LIMIT_MAX,
        )?;
        let window_secs = parse_or(
            "RATE_LIMIT_WINDOW_SECS",
            get("RATE_LIMIT_WINDOW_SECS"),
            DEFAULT_RATE_LIMIT_WINDOW_SECS,
        )?;
        if max_requests == 0 || window_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_LIMIT_MAX_REQUESTS",
                reason: "limit and window must both be greater than zero".to_string(),
            });
        }

        let trusted_proxies = match get("TRUSTED_PROXIES") {
            Some(raw) => TrustedProxies::parse_list(&raw).map_err(|e| ConfigError::Invalid {
                name: "TRUSTED_PROXIES",
                reason: e.to_string(),
            })?,
            None => TrustedProxies::default(),
        };

        let admin_bootstrap = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_expires: Duration::from_secs(jwt_expires_secs),
            port,
            frontend_origins,
            cookie_secure,
            rate_limit: RateLimitConfig::new(max_requests, window_secs),
            trusted_proxies,
            admin_bootstrap,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgres://localhost/jasaweb"),
            ("JWT_SECRET", SECRET),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&base())).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.jwt_expires, Duration::from_secs(86_400));
        assert_eq!(config.database_max_connections, 5);
        assert!(config.cookie_secure);
        assert!(config.admin_bootstrap.is_none());
        assert!(config.trusted_proxies.is_empty());
        assert_eq!(config.frontend_origins, vec!["http://localhost:4321"]);
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "mysql://localhost/db"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DATABASE_URL", .. }));
    }

    #[test]
    fn test_rejects_short_secret() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgresql://localhost/db"),
            ("JWT_SECRET", "short"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "JWT_SECRET", .. }));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = base();
        pairs.extend([
            ("PORT", "8080"),
            ("COOKIE_SECURE", "false"),
            ("FRONTEND_ORIGINS", "https://a.example/, https://b.example"),
            ("RATE_LIMIT_MAX_REQUESTS", "20"),
            ("RATE_LIMIT_WINDOW_SECS", "30"),
            ("ADMIN_EMAIL", "admin@example.com"),
            ("ADMIN_PASSWORD", "correct horse"),
            ("TRUSTED_PROXIES", "10.0.0.1, 10.0.0.2"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(config.trusted_proxies.contains(&"10.0.0.2".parse().unwrap()));
        assert_eq!(config.port, 8080);
        assert!(!config.cookie_secure);
        assert_eq!(
            config.frontend_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window, Duration::from_secs(30));
        assert_eq!(
            config.admin_bootstrap.map(|a| a.email).as_deref(),
            Some("admin@example.com")
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = base();
        pairs.push(("PORT", "eighty"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn test_invalid_trusted_proxy() {
        let mut pairs = base();
        pairs.push(("TRUSTED_PROXIES", "10.0.0.1, proxy.internal"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TRUSTED_PROXIES", .. }));
    }

    #[test]
    fn test_admin_bootstrap_requires_both() {
        let mut pairs = base();
        pairs.push(("ADMIN_EMAIL", "admin@example.com"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ADMIN_PASSWORD"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::from_lookup(lookup(&base())).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("[REDACTED]"));
    }
}
