//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use sqlx::SqlitePool;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use todolist_core::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Bind the configured address and serve until SIGINT or SIGTERM
pub async fn start_server(config: &Config, app: Router, pool: SqlitePool) -> Result<()> {
    let addr = config.bind_address();
    tracing::info!(addr = %addr, "Starting server");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        environment = %config.environment,
        "Server ready and accepting connections"
    );

    serve(
        listener,
        app,
        pool,
        Duration::from_secs(config.shutdown_grace_period_secs),
        shutdown_signal(),
    )
    .await
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// After the signal no new connections are accepted and in-flight requests get
/// up to `grace_period` to finish before they are dropped. The pool is closed
/// last in every case.
pub async fn serve<S>(
    listener: TcpListener,
    app: Router,
    pool: SqlitePool,
    grace_period: Duration,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()> + Send,
{
    let token = CancellationToken::new();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(token.clone().cancelled_owned());
    let mut server_task = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server_task => {
            pool.close().await;
            return result
                .context("Server task failed")?
                .context("Server error");
        }
        _ = shutdown => {}
    }

    tracing::info!(
        grace_period_secs = grace_period.as_secs(),
        "Shutting down gracefully..."
    );
    token.cancel();

    let outcome = match tokio::time::timeout(grace_period, &mut server_task).await {
        Ok(Ok(Ok(()))) => {
            tracing::info!("Server stopped gracefully");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(anyhow::Error::new(e).context("Server error")),
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("Server task failed")),
        Err(_) => {
            tracing::warn!("Graceful shutdown timed out, dropping in-flight requests");
            server_task.abort();
            Ok(())
        }
    };

    pool.close().await;
    tracing::info!("Database connections closed");
    outcome
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires; the other one
/// still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }
}
