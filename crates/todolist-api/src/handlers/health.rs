//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// "ok" or "unavailable"
    pub database: String,
    pub version: String,
    /// RFC 3339 UTC timestamp
    pub time: String,
}

/// Run an async check with timeout; `true` only when it finished successfully in time.
async fn run_check<F, E>(timeout: Duration, f: F) -> bool
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database health check failed");
            false
        }
        Err(_) => {
            tracing::error!("Database health check timed out");
            false
        }
    }
}

/// Service health and store connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are available", body = HealthResponse),
        (status = 503, description = "Database is unavailable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database_ok = run_check(CHECK_TIMEOUT, state.todos.store_available()).await;

    let response = HealthResponse {
        status: "ok".to_string(),
        database: if database_ok { "ok" } else { "unavailable" }.to_string(),
        version: todolist_core::VERSION.to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    let status_code = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
