//! Client IP extraction
//!
//! Forwarding headers are only honoured when the service is configured to sit
//! behind trusted proxies; otherwise the socket peer address is used.

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client IP for a request, using `ConnectInfo` when the server provides it
pub fn client_ip(request: &Request, trusted_proxy_count: usize) -> String {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    extract_client_ip(request.headers(), socket_addr.as_ref(), trusted_proxy_count)
}

/// Extract and validate the client IP.
///
/// With `trusted_proxy_count == 0` the headers are ignored entirely, since any
/// client could set them. With N trusted proxies, the address N hops from the end
/// of `X-Forwarded-For` is the client; `X-Real-IP` is the fallback.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    if trusted_proxy_count > 0 {
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| extract_from_forwarded_for(v, trusted_proxy_count))
        {
            return ip;
        }

        if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
            let trimmed = real_ip.trim();
            if is_valid_ip(trimmed) {
                return trimmed.to_string();
            }
        }
    }

    socket_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Pick the client entry from an `X-Forwarded-For` chain (`client, proxy1, proxy2`)
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    // Shorter chain than expected: the first entry is the best we have
    let candidate = if ips.len() <= trusted_proxy_count {
        ips.first()
    } else {
        ips.get(ips.len() - trusted_proxy_count - 1)
    }?;

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}
