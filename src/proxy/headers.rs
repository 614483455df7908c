//! Proxy header hygiene.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions (RFC 9110 §7.6.1)
//! - Record the client address in `X-Forwarded-For` / `X-Real-IP`
//! - Record the downstream scheme in `X-Forwarded-Proto`
//!
//! The `Host` header is deliberately left alone: upstreams see the host the
//! browser requested, not the upstream's own address.

use std::net::IpAddr;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION};

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Headers that only apply to a single connection and must not cross the
/// proxy hop.
fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name,
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Connection can nominate additional per-hop headers by name.
    let nominated: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| token.trim().parse::<HeaderName>().ok())
        .collect();

    for name in nominated {
        headers.remove(&name);
    }

    let fixed: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_hop_by_hop(name.as_str()))
        .cloned()
        .collect();

    for name in fixed {
        headers.remove(&name);
    }
}

/// Stamp the forwarding headers onto an upstream-bound request.
///
/// `X-Forwarded-For` appends to any chain a downstream proxy already built;
/// `X-Real-IP` is always overwritten with the directly connected peer.
pub fn apply_forwarding_headers(headers: &mut HeaderMap, client_ip: IpAddr) {
    let ip_text = client_ip.to_string();
    let ip_value = match HeaderValue::from_str(&ip_text) {
        Ok(value) => value,
        // IP addresses always format as valid header values.
        Err(_) => return,
    };

    let forwarded_for = match headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
    {
        Some(existing) => HeaderValue::from_str(&format!("{existing}, {ip_text}"))
            .unwrap_or_else(|_| ip_value.clone()),
        None => ip_value.clone(),
    };

    headers.insert(X_FORWARDED_FOR, forwarded_for);
    headers.insert(X_REAL_IP, ip_value);
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
}
