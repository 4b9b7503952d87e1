//! Test helpers: build the full router over a private in-memory database.
//!
//! Run from workspace root: `cargo test -p todolist-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use todolist_api::constants;
use todolist_api::setup;
use todolist_core::Config;

/// API path prefix for tests (e.g. `/api/todos`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the pool behind it.
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a todo and return the response body
    pub async fn create_todo(&self, text: &str) -> Value {
        let response = self
            .server
            .post(&api_path("/todos"))
            .json(&serde_json::json!({ "text": text }))
            .await;
        assert_eq!(response.status_code(), 201);
        response.json::<Value>()
    }
}

/// Config built only from `overrides`, never from the process environment
pub fn create_test_config(overrides: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("Failed to build test config")
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let config = create_test_config(overrides);
    let pool = todolist_db::connect_in_memory()
        .await
        .expect("Failed to open test database");

    let (_state, router) = setup::build_app(&config, pool.clone())
        .await
        .expect("Failed to build router");

    let server = TestServer::new(router.into_make_service()).expect("Failed to start test server");

    TestApp { server, pool }
}
