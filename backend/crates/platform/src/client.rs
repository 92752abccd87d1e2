//! Client identification utilities
//!
//! Resolves the caller's IP address. The socket peer is authoritative;
//! `X-Forwarded-For` and `X-Real-IP` only count when the peer is a
//! configured trusted proxy.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

/// Proxy addresses whose forwarding headers are believed
///
/// Empty by default, which ignores forwarding headers entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxies(Vec<IpAddr>);

impl TrustedProxies {
    pub fn new(addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        Self(addrs.into_iter().collect())
    }

    /// Parse a comma-separated address list such as `10.0.0.1, ::1`
    pub fn parse_list(raw: &str) -> Result<Self, AddrParseError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<IpAddr>, _>>()
            .map(Self)
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Client IP for a request that arrived from `peer`
///
/// Behind trusted proxies, walks `X-Forwarded-For` from the right and
/// returns the first hop that is not a trusted proxy. An unparseable entry
/// stops the walk at the last trusted hop.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted: &TrustedProxies,
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted.contains(&peer) {
        return Some(peer);
    }

    if let Some(chain) = header_str(headers, "x-forwarded-for") {
        let mut hop = peer;
        for entry in chain.rsplit(',') {
            match entry.trim().parse::<IpAddr>() {
                Ok(ip) if trusted.contains(&ip) => hop = ip,
                Ok(ip) => return Some(ip),
                Err(_) => break,
            }
        }
        return Some(hop);
    }

    header_str(headers, "x-real-ip")
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .or(Some(peer))
}

/// Socket peer address, present when the server was started with
/// `into_make_service_with_connect_info`.
pub fn connect_ip(extensions: &Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

/// Client IP for a request, as a string key. `"unknown"` when unresolvable.
pub fn client_ip_key(
    headers: &HeaderMap,
    extensions: &Extensions,
    trusted: &TrustedProxies,
) -> String {
    resolve_client_ip(headers, connect_ip(extensions), trusted)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn ip(raw: &str) -> IpAddr {
        raw.parse().unwrap()
    }

    fn forwarded(chain: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(chain));
        headers
    }

    #[test]
    fn test_headers_ignored_without_trusted_proxies() {
        let mut headers = forwarded("192.168.1.1");
        headers.insert("x-real-ip", HeaderValue::from_static("10.1.2.3"));

        let resolved =
            resolve_client_ip(&headers, Some(ip("198.51.100.7")), &TrustedProxies::default());
        assert_eq!(resolved, Some(ip("198.51.100.7")));
    }

    #[test]
    fn test_headers_ignored_from_untrusted_peer() {
        let trusted = TrustedProxies::new([ip("10.0.0.1")]);
        let headers = forwarded("192.168.1.1");
        let resolved = resolve_client_ip(&headers, Some(ip("198.51.100.7")), &trusted);
        assert_eq!(resolved, Some(ip("198.51.100.7")));
    }

    #[test]
    fn test_rightmost_untrusted_hop_behind_proxies() {
        let trusted = TrustedProxies::new([ip("10.0.0.1"), ip("10.0.0.2")]);
        // Left-most entry is client supplied and must not win
        let headers = forwarded("1.2.3.4, 203.0.113.5, 10.0.0.2");

        let resolved = resolve_client_ip(&headers, Some(ip("10.0.0.1")), &trusted);
        assert_eq!(resolved, Some(ip("203.0.113.5")));
    }

    #[test]
    fn test_garbage_entry_stops_at_last_trusted_hop() {
        let trusted = TrustedProxies::new([ip("10.0.0.1"), ip("10.0.0.2")]);
        let headers = forwarded("203.0.113.5, not-an-ip, 10.0.0.2");

        let resolved = resolve_client_ip(&headers, Some(ip("10.0.0.1")), &trusted);
        assert_eq!(resolved, Some(ip("10.0.0.2")));
    }

    #[test]
    fn test_real_ip_from_trusted_proxy() {
        let trusted = TrustedProxies::new([ip("10.0.0.1")]);
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.1.2.3"));

        assert_eq!(
            resolve_client_ip(&headers, Some(ip("10.0.0.1")), &trusted),
            Some(ip("10.1.2.3"))
        );
    }

    #[test]
    fn test_no_peer_is_unresolved() {
        let trusted = TrustedProxies::new([ip("10.0.0.1")]);
        assert_eq!(resolve_client_ip(&forwarded("192.168.1.1"), None, &trusted), None);
    }

    #[test]
    fn test_parse_list() {
        let trusted = TrustedProxies::parse_list(" 10.0.0.1, ::1 ,").unwrap();
        assert!(trusted.contains(&ip("10.0.0.1")));
        assert!(trusted.contains(&ip("::1")));
        assert!(TrustedProxies::parse_list("10.0.0.0/8").is_err());
        assert!(TrustedProxies::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_client_ip_key_unknown() {
        let headers = HeaderMap::new();
        let extensions = Extensions::new();
        assert_eq!(
            client_ip_key(&headers, &extensions, &TrustedProxies::default()),
            "unknown"
        );
    }

    #[test]
    fn test_client_ip_key_from_connect_info() {
        let headers = forwarded("192.168.1.1");
        let mut extensions = Extensions::new();
        let addr: SocketAddr = "203.0.113.9:5555".parse().unwrap();
        extensions.insert(ConnectInfo(addr));
        assert_eq!(
            client_ip_key(&headers, &extensions, &TrustedProxies::default()),
            "203.0.113.9"
        );
    }
}
