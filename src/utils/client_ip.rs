//! Client IP extraction from HTTP request metadata.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Resolves the client IP for fingerprinting.
///
/// When `behind_proxy` is `true`, checks `X-Forwarded-For` (leftmost entry) and
/// `X-Real-IP` before falling back to the peer socket address.
///
/// # Security
///
/// Only enable proxy-header mode (`behind_proxy = true`) when a trusted proxy
/// is guaranteed to set these headers, as they can otherwise be forged by
/// clients.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy {
        // X-Forwarded-For: client, proxy1, proxy2; take the leftmost (original client)
        if let Some(xff) = headers.get("x-forwarded-for")
            && let Ok(s) = xff.to_str()
            && let Some(ip) = s.split(',').next()
            && !ip.trim().is_empty()
        {
            return ip.trim().to_string();
        }
        // X-Real-IP set by nginx
        if let Some(xri) = headers.get("x-real-ip")
            && let Ok(ip) = xri.to_str()
            && !ip.trim().is_empty()
        {
            return ip.trim().to_string();
        }
    }

    peer.ip().to_string()
}
