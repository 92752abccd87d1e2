//! CSRF double-submit tokens
//!
//! The token lives in a readable cookie and must be echoed in a header on
//! state-changing requests that authenticate with the session cookie.

use http::Method;
use platform::crypto::{constant_time_eq, random_token};

/// Random bytes per token
const CSRF_TOKEN_BYTES: usize = 32;

pub fn generate_csrf_token() -> String {
    random_token(CSRF_TOKEN_BYTES)
}

/// True only when both tokens are present, non-empty and identical
pub fn validate_csrf(header: Option<&str>, cookie: Option<&str>) -> bool {
    match (header, cookie) {
        (Some(header), Some(cookie)) if !header.is_empty() => {
            constant_time_eq(header.as_bytes(), cookie.as_bytes())
        }
        _ => false,
    }
}

/// Methods that change server state
pub fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Whether a request to `path` with `method` must carry a CSRF token
pub fn requires_csrf(method: &Method, path: &str, protected_prefixes: &[String]) -> bool {
    is_state_changing(method)
        && protected_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
}

/// Segment-aware prefix match: `/api/admin` covers `/api/admin/x` but not
/// `/api/administrator`.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}
