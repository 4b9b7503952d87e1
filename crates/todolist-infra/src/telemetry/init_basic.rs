use todolist_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives for a LOG_LEVEL value such as "info" or "debug"
pub fn default_filter(log_level: &str) -> String {
    format!("{},sqlx=warn,tower_http=warn", log_level)
}

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence over `log_level` when set. JSON output flattens
/// event fields into the top-level object so each log line is one flat record.
pub fn init_telemetry(
    service_name: &str,
    service_version: &str,
    log_level: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?,
    }

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());

    tracing::info!(
        service = service_name,
        version = service_version,
        host = %host,
        log_level = log_level,
        "Logger initialized"
    );
    Ok(())
}
