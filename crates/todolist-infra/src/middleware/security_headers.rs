use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};

/// Security headers middleware
///
/// Sets a fixed set of hardening headers on every response, including errors
/// produced further down the stack.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    // Prevent MIME type sniffing
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));

    // Prevent clickjacking
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));

    headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));

    // Force HTTPS for 1 year, include subdomains
    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    response
}
