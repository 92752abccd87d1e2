//! Rate Limiting Infrastructure
//!
//! Sliding-window limiter keyed by `ip|user|path`, plus the axum middleware
//! that applies it. The store is per process; [`RateLimitStore`] is the seam
//! for a shared backend.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{MatchedPath, Request, State};
use axum::http::{HeaderMap, HeaderValue, header::RETRY_AFTER};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use rand::Rng;
use thiserror::Error;

use crate::client::{TrustedProxies, client_ip_key};

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";

/// Chance that a single check also sweeps stale keys
const DEFAULT_CLEANUP_PROBABILITY: f64 = 0.01;

/// Tracked key count above which every check sweeps
const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the oldest counted request leaves the window
    pub retry_after_secs: u64,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("rate limit state is unavailable")]
    Unavailable,
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        AppError::service_unavailable("Rate limiting is temporarily unavailable").with_source(err)
    }
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count the request against `key` if it fits in the window
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug)]
struct Bucket {
    hits: VecDeque<i64>,
    window_ms: i64,
}

impl Bucket {
    fn prune(&mut self, now_ms: i64) {
        let cutoff = now_ms - self.window_ms;
        while self.hits.front().is_some_and(|&ts| ts <= cutoff) {
            self.hits.pop_front();
        }
    }
}

/// Process-local sliding-window store
///
/// The lock is only held for the synchronous prune/record step.
#[derive(Debug)]
pub struct InMemoryRateLimitStore {
    buckets: Mutex<HashMap<String, Bucket>>,
    cleanup_probability: f64,
    max_tracked_keys: usize,
}

impl Default for InMemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            cleanup_probability: DEFAULT_CLEANUP_PROBABILITY,
            max_tracked_keys: DEFAULT_MAX_TRACKED_KEYS,
        }
    }

    pub fn with_cleanup(mut self, probability: f64, max_tracked_keys: usize) -> Self {
        self.cleanup_probability = probability.clamp(0.0, 1.0);
        self.max_tracked_keys = max_tracked_keys;
        self
    }

    /// Check `key` as of `now_ms` (milliseconds since the epoch)
    pub fn check_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, RateLimitError> {
        let mut buckets = self.buckets.lock().map_err(|_| RateLimitError::Unavailable)?;
        let window_ms = config.window_ms();

        let bucket = buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            hits: VecDeque::new(),
            window_ms,
        });
        bucket.window_ms = window_ms;
        bucket.prune(now_ms);

        let count = u32::try_from(bucket.hits.len()).unwrap_or(u32::MAX);
        let result = if count >= config.max_requests {
            let oldest = bucket.hits.front().copied().unwrap_or(now_ms);
            let wait_ms = (oldest + window_ms - now_ms).max(0);
            RateLimitResult {
                allowed: false,
                limit: config.max_requests,
                remaining: 0,
                retry_after_secs: u64::try_from(wait_ms).unwrap_or(0).div_ceil(1000).max(1),
            }
        } else {
            bucket.hits.push_back(now_ms);
            RateLimitResult {
                allowed: true,
                limit: config.max_requests,
                remaining: config.max_requests - count - 1,
                retry_after_secs: 0,
            }
        };

        let should_sweep = buckets.len() > self.max_tracked_keys
            || rand::thread_rng().gen_bool(self.cleanup_probability);
        if should_sweep {
            let removed = sweep(&mut buckets, now_ms);
            tracing::debug!(removed, remaining = buckets.len(), "Swept rate limit buckets");
        }

        Ok(result)
    }

    /// Drop every bucket with no request inside its window
    pub fn cleanup_at(&self, now_ms: i64) -> usize {
        match self.buckets.lock() {
            Ok(mut buckets) => sweep(&mut buckets, now_ms),
            Err(_) => 0,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().map(|b| b.len()).unwrap_or(0)
    }
}

fn sweep(buckets: &mut HashMap<String, Bucket>, now_ms: i64) -> usize {
    let before = buckets.len();
    buckets.retain(|_, bucket| {
        bucket.prune(now_ms);
        !bucket.hits.is_empty()
    });
    before - buckets.len()
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        self.check_at(key, config, now_ms())
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Identity of the authenticated caller, inserted into request extensions by
/// the authentication middleware. Anonymous requests are keyed as `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSubject(pub String);

/// Middleware state
#[derive(Debug)]
pub struct RateLimitState<S> {
    pub store: Arc<S>,
    pub config: RateLimitConfig,
    /// Proxies allowed to report the client address in forwarding headers
    pub trusted_proxies: TrustedProxies,
}

impl<S> Clone for RateLimitState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            trusted_proxies: self.trusted_proxies.clone(),
        }
    }
}

impl<S> RateLimitState<S> {
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            trusted_proxies: TrustedProxies::default(),
        }
    }

    pub fn with_trusted_proxies(mut self, trusted_proxies: TrustedProxies) -> Self {
        self.trusted_proxies = trusted_proxies;
        self
    }
}

/// Composite bucket key for a request
pub fn request_key(req: &Request, trusted_proxies: &TrustedProxies) -> String {
    let ip = client_ip_key(req.headers(), req.extensions(), trusted_proxies);
    let user = req
        .extensions()
        .get::<RateLimitSubject>()
        .map(|s| s.0.as_str())
        .unwrap_or("anonymous");
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str())
        .unwrap_or_else(|| req.uri().path());
    format!("{ip}|{user}|{path}")
}

/// Middleware that rejects requests over the configured limit with 429
///
/// A failing store lets the request through.
pub async fn rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: RateLimitStore + Send + Sync + 'static,
{
    let key = request_key(&req, &state.trusted_proxies);

    let result = match state.store.check_and_increment(&key, &state.config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, key = %key, "Rate limit check failed, allowing request");
            return next.run(req).await;
        }
    };

    if !result.allowed {
        tracing::warn!(
            key = %key,
            retry_after = result.retry_after_secs,
            "Rate limit exceeded"
        );
        let mut response = AppError::too_many_requests("Too many requests")
            .with_action(format!(
                "Retry after {} seconds",
                result.retry_after_secs
            ))
            .into_response();
        let headers = response.headers_mut();
        headers.insert(RETRY_AFTER, HeaderValue::from(result.retry_after_secs));
        insert_limit_headers(headers, &result);
        return response;
    }

    let mut response = next.run(req).await;
    insert_limit_headers(response.headers_mut(), &result);
    response
}

fn insert_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(HEADER_LIMIT, HeaderValue::from(result.limit));
    headers.insert(HEADER_REMAINING, HeaderValue::from(result.remaining));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, SocketAddr};

    use axum::extract::ConnectInfo;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::post};
    use tower::ServiceExt;

    fn quiet_store() -> InMemoryRateLimitStore {
        InMemoryRateLimitStore::new().with_cleanup(0.0, usize::MAX)
    }

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let store = quiet_store();
        let config = RateLimitConfig::new(3, 60);

        for expected_remaining in [2, 1, 0] {
            let result = store.check_at("k", &config, 1_000).unwrap();
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let rejected = store.check_at("k", &config, 2_000).unwrap();
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.retry_after_secs, 59);
    }

    #[test]
    fn test_accepts_again_after_window() {
        let store = quiet_store();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("k", &config, 0).unwrap().allowed);
        assert!(!store.check_at("k", &config, 59_999).unwrap().allowed);
        assert!(store.check_at("k", &config, 60_000).unwrap().allowed);
    }

    #[test]
    fn test_rejected_requests_are_not_counted() {
        let store = quiet_store();
        let config = RateLimitConfig::new(1, 10);

        assert!(store.check_at("k", &config, 0).unwrap().allowed);
        for t in [1_000, 5_000, 9_000] {
            assert!(!store.check_at("k", &config, t).unwrap().allowed);
        }
        assert!(store.check_at("k", &config, 10_000).unwrap().allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = quiet_store();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("a", &config, 0).unwrap().allowed);
        assert!(store.check_at("b", &config, 0).unwrap().allowed);
        assert!(!store.check_at("a", &config, 1).unwrap().allowed);
    }

    #[test]
    fn test_cleanup_removes_stale_keys() {
        let store = quiet_store();
        let config = RateLimitConfig::new(5, 1);

        store.check_at("old", &config, 0).unwrap();
        store.check_at("new", &config, 1_500).unwrap();
        assert_eq!(store.tracked_keys(), 2);

        assert_eq!(store.cleanup_at(2_000), 1);
        assert_eq!(store.tracked_keys(), 1);
    }

    #[test]
    fn test_sweeps_when_key_cap_exceeded() {
        let store = InMemoryRateLimitStore::new().with_cleanup(0.0, 2);
        let config = RateLimitConfig::new(5, 1);

        store.check_at("a", &config, 0).unwrap();
        store.check_at("b", &config, 0).unwrap();
        // Third key pushes the map over the cap; a and b are stale by now
        store.check_at("c", &config, 5_000).unwrap();
        assert_eq!(store.tracked_keys(), 1);
    }

    fn limited_router(max: u32) -> Router {
        limited_router_behind(max, TrustedProxies::default())
    }

    fn limited_router_behind(max: u32, trusted: TrustedProxies) -> Router {
        let state = RateLimitState::new(
            Arc::new(quiet_store()),
            RateLimitConfig::new(max, 60),
        )
        .with_trusted_proxies(trusted);
        Router::new()
            .route("/login", post(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(state, rate_limit::<InMemoryRateLimitStore>))
    }

    fn login_request(peer: &str) -> Request {
        forwarded_login(peer, None)
    }

    fn forwarded_login(peer: &str, forwarded_for: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/login");
        if let Some(chain) = forwarded_for {
            builder = builder.header("x-forwarded-for", chain);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let addr = SocketAddr::new(peer.parse().unwrap(), 40_000);
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_headers() {
        let app = limited_router(2);

        for remaining in ["1", "0"] {
            let res = app.clone().oneshot(login_request("10.0.0.1")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.headers()[HEADER_LIMIT], "2");
            assert_eq!(res.headers()[HEADER_REMAINING], remaining);
        }

        let res = app.clone().oneshot(login_request("10.0.0.1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(res.headers().contains_key(RETRY_AFTER));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "TOO_MANY_REQUESTS");

        // A different client is unaffected
        let res = app.oneshot(login_request("10.0.0.2")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_shares_the_peer_bucket() {
        let app = limited_router(2);

        let mut allowed = 0;
        for i in 0..20 {
            let chain = format!("203.0.113.{i}");
            let res = app
                .clone()
                .oneshot(forwarded_login("198.51.100.7", Some(&chain)))
                .await
                .unwrap();
            if res.status() == StatusCode::OK {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 2);
    }

    #[tokio::test]
    async fn test_trusted_proxy_keys_on_forwarded_client() {
        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        let app = limited_router_behind(1, TrustedProxies::new([proxy]));

        let res = app
            .clone()
            .oneshot(forwarded_login("10.0.0.1", Some("203.0.113.1")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        // A spoofed left-most entry does not escape the real client's bucket
        let res = app
            .clone()
            .oneshot(forwarded_login("10.0.0.1", Some("192.0.2.99, 203.0.113.1")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        let res = app
            .oneshot(forwarded_login("10.0.0.1", Some("203.0.113.2")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_request_key_uses_subject() {
        let trusted = TrustedProxies::default();
        let mut req = login_request("10.0.0.1");
        assert_eq!(request_key(&req, &trusted), "10.0.0.1|anonymous|/login");

        req.extensions_mut().insert(RateLimitSubject("user-1".to_string()));
        assert_eq!(request_key(&req, &trusted), "10.0.0.1|user-1|/login");
    }
}
