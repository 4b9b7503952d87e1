//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use todolist_core::Config;

/// Initialize the entire application: telemetry, database, state and routes
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router, SqlitePool)> {
    todolist_infra::init_telemetry(
        "todolist-api",
        todolist_core::VERSION,
        &config.log_level,
        config.log_format,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        bind_address = %config.bind_address(),
        "Configuration loaded and validated successfully"
    );

    let pool = todolist_db::connect(&config)
        .await
        .context("Failed to initialize database")?;

    let (state, router) = build_app(&config, pool.clone()).await?;
    Ok((state, router, pool))
}

/// Build state and router on an existing pool
pub async fn build_app(config: &Config, pool: SqlitePool) -> Result<(Arc<AppState>, axum::Router)> {
    let state = AppState::new(config.clone(), pool);
    let router = routes::setup_routes(config, state.clone()).await?;
    Ok((state, router))
}
