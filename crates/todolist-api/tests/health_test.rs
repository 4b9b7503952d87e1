//! Health endpoint integration tests.

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_ok() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["version"], todolist_core::VERSION);
    assert!(body["time"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let app = setup_test_app().await;
    app.pool().close().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 503);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let app = setup_test_app().await;
    app.pool().close().await;

    let response = app.client().get("/api/todos").await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["error"], "Failed to retrieve todos");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let spec = response.json::<Value>();
    assert!(spec["paths"]["/api/todos"].is_object());
    assert!(spec["paths"]["/api/todos/{id}"].is_object());
}
