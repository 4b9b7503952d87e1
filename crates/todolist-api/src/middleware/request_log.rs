//! Request logging middleware
//!
//! Emits one canonical log line per request after the inner stack has produced
//! its response. The level follows the status class: error for 5xx, warn for
//! 4xx, info otherwise. Slow requests get an additional warning.

use axum::{
    body::HttpBody,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use todolist_infra::get_request_id;

use crate::constants::SLOW_THRESHOLD;
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip;

/// Response body size, from the body itself when known or else `Content-Length`
fn response_size(response: &Response) -> Option<u64> {
    response.body().size_hint().exact().or_else(|| {
        response
            .headers()
            .get("content-length")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse().ok())
    })
}

macro_rules! log_request {
    ($level:ident, $($fields:tt)*) => {
        tracing::$level!($($fields)*, "HTTP request")
    };
}

pub async fn request_log_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let ip = client_ip(&request, state.config.trusted_proxy_count);
    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request_id = get_request_id(&request).unwrap_or_default();

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let duration_ms = duration.as_millis() as u64;
    let status = response.status().as_u16();
    let size = response_size(&response).unwrap_or(0);

    match status {
        s if s >= 500 => log_request!(
            error,
            method = %method, path = %path, query = %query, status, duration_ms,
            client_ip = %ip, user_agent = %user_agent, response_size = size,
            request_id = %request_id
        ),
        400..=499 => log_request!(
            warn,
            method = %method, path = %path, query = %query, status, duration_ms,
            client_ip = %ip, user_agent = %user_agent, response_size = size,
            request_id = %request_id
        ),
        _ => log_request!(
            info,
            method = %method, path = %path, query = %query, status, duration_ms,
            client_ip = %ip, user_agent = %user_agent, response_size = size,
            request_id = %request_id
        ),
    }

    if duration > SLOW_THRESHOLD {
        tracing::warn!(
            method = %method,
            path = %path,
            duration_ms,
            request_id = %request_id,
            "Slow request detected"
        );
    }

    response
}
