//! Middleware stack integration tests: headers, CORS, rate limiting, body limits.

mod helpers;

use axum::http::Method;
use helpers::{api_path, setup_test_app, setup_test_app_with};
use serde_json::{json, Value};

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = setup_test_app().await;

    for path in ["/health".to_string(), api_path("/todos"), api_path("/todos/999")] {
        let response = app.client().get(&path).await;
        let headers = response.headers();

        assert_eq!(headers["x-xss-protection"], "1; mode=block", "{}", path);
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["strict-transport-security"], "max-age=31536000; includeSubDomains");
    }
}

#[tokio::test]
async fn test_request_id_generated_and_echoed() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(!generated.is_empty());

    let response = app
        .client()
        .get("/health")
        .add_header("x-request-id", "client-supplied-id")
        .await;
    assert_eq!(response.headers()["x-request-id"], "client-supplied-id");
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let app = setup_test_app_with(&[("ALLOWED_ORIGINS", "https://app.example.com")]).await;

    let response = app
        .client()
        .method(Method::OPTIONS, &api_path("/todos"))
        .add_header("origin", "https://app.example.com")
        .add_header("access-control-request-method", "POST")
        .add_header("access-control-request-headers", "content-type")
        .await;

    assert_eq!(response.status_code(), 200);
    let headers = response.headers();
    assert_eq!(
        headers["access-control-allow-origin"],
        "https://app.example.com"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-max-age"], "43200");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "missing {}", method);
    }
}

#[tokio::test]
async fn test_cors_disallowed_origin() {
    let app = setup_test_app_with(&[("ALLOWED_ORIGINS", "https://app.example.com")]).await;

    let response = app
        .client()
        .get(&api_path("/todos"))
        .add_header("origin", "https://evil.example.com")
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}

#[tokio::test]
async fn test_cors_wildcard_mirrors_origin() {
    let app = setup_test_app_with(&[("ALLOWED_ORIGINS", "*")]).await;

    let response = app
        .client()
        .get(&api_path("/todos"))
        .add_header("origin", "https://anything.example.org")
        .await;

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://anything.example.org"
    );
    assert_eq!(
        response.headers()["access-control-expose-headers"]
            .to_str()
            .unwrap()
            .to_lowercase(),
        "content-length"
    );
}

#[tokio::test]
async fn test_rate_limit_headers() {
    let app = setup_test_app_with(&[("RATE_LIMIT_MAX", "5")]).await;

    let response = app.client().get(&api_path("/todos")).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.headers()["x-ratelimit-limit"], "5");
    assert_eq!(response.headers()["x-ratelimit-remaining"], "4");
    let reset: u64 = response.headers()["x-ratelimit-reset"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&reset));
}

#[tokio::test]
async fn test_rate_limit_exceeded_per_client() {
    let app = setup_test_app_with(&[("RATE_LIMIT_MAX", "3"), ("TRUSTED_PROXY_COUNT", "1")]).await;

    for _ in 0..3 {
        let response = app
            .client()
            .get(&api_path("/todos"))
            .add_header("x-forwarded-for", "203.0.113.7")
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let response = app
        .client()
        .post(&api_path("/todos"))
        .add_header("x-forwarded-for", "203.0.113.7")
        .json(&json!({ "text": "blocked" }))
        .await;
    assert_eq!(response.status_code(), 429);
    assert_eq!(
        response.json::<Value>()["error"],
        "Too many requests. Please slow down."
    );
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    // Security headers still apply to rejected requests
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    // The blocked request never reached the store
    let other = app
        .client()
        .get(&api_path("/todos"))
        .add_header("x-forwarded-for", "198.51.100.20")
        .await;
    assert_eq!(other.status_code(), 200);
    assert_eq!(other.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let app = setup_test_app_with(&[("MAX_BODY_BYTES", "64")]).await;

    let response = app
        .client()
        .post(&api_path("/todos"))
        .json(&json!({ "text": "x".repeat(200) }))
        .await;

    assert_eq!(response.status_code(), 413);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/nothing-here").await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
