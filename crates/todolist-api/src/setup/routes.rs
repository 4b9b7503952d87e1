//! Route configuration and middleware stack

use crate::constants::{API_PREFIX, RATE_LIMIT_CLEANUP_INTERVAL};
use crate::handlers;
use crate::middleware::{
    rate_limit_middleware, recovery_middleware, request_id_middleware, request_log_middleware,
    security_headers_middleware, HttpRateLimiter,
};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use todolist_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Build the application router with the full middleware stack.
///
/// Outermost first: recovery, concurrency limit, request id, request log,
/// security headers, CORS, rate limit, body limit, handlers.
pub async fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let rate_limiter = setup_rate_limiter(config);

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        max_body_bytes = config.max_body_bytes,
        "HTTP limits configured"
    );

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(todo_routes())
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_log_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit))
        .layer(axum::middleware::from_fn(recovery_middleware))
        .with_state(state);

    Ok(app)
}

fn todo_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/todos", API_PREFIX),
            get(handlers::todos::list_todos).post(handlers::todos::create_todo),
        )
        .route(
            &format!("{}/todos/{{id}}", API_PREFIX),
            get(handlers::todos::get_todo)
                .put(handlers::todos::update_todo)
                .delete(handlers::todos::delete_todo),
        )
}

/// CORS policy. A `*` entry mirrors the request origin, since credentials are
/// allowed and a literal wildcard cannot be combined with them.
pub fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE);

    if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(cors.allow_origin(AllowOrigin::mirror_request()));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", o))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(origins = ?config.cors_origins, "CORS configured");
    Ok(cors.allow_origin(origins))
}

/// Setup rate limiter with periodic cleanup task
fn setup_rate_limiter(config: &Config) -> Arc<HttpRateLimiter> {
    let rate_limiter = Arc::new(
        HttpRateLimiter::with_shards(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_seconds()),
            config.rate_limiter_shard_count,
        )
        .with_trusted_proxies(config.trusted_proxy_count),
    );

    rate_limiter.spawn_cleanup(RATE_LIMIT_CLEANUP_INTERVAL);

    tracing::info!(
        rate_limit_max = config.rate_limit_max,
        rate_limit_window_minutes = config.rate_limit_window_minutes,
        shard_count = config.rate_limiter_shard_count,
        trusted_proxy_count = config.trusted_proxy_count,
        "HTTP rate limiting enabled"
    );
    rate_limiter
}
