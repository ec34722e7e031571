//! Client IP resolution for click events and rate limiting.

use axum::http::HeaderMap;
use std::net::IpAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolves the client IP of a request.
///
/// Proxy headers are consulted only when `behind_proxy` is set, in this
/// order: first hop of `X-Forwarded-For`, then `X-Real-IP`. The socket peer
/// address is the fallback and the only source otherwise.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
/// let ip = client_ip(&headers, Some("10.0.0.1".parse().unwrap()), true);
/// assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
/// ```
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy {
        let forwarded = header_str(headers, X_FORWARDED_FOR)
            .and_then(|value| value.split(',').next())
            .and_then(parse_ip);

        if let Some(ip) = forwarded.or_else(|| header_str(headers, X_REAL_IP).and_then(parse_ip)) {
            return Some(ip);
        }
    }

    peer
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}
