//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional
//! `.env` file). `Config::from_lookup` takes any key lookup function so tests can
//! build configurations without touching process-wide state.

use std::env;
use std::str::FromStr;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE_URL: &str = "sqlite://todos.db?mode=rwc";
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const ALLOWED_ORIGINS: &str = "http://localhost:3000";
const RATE_LIMIT_MAX: u32 = 100;
const RATE_LIMIT_WINDOW_MINUTES: u64 = 1;
const RATE_LIMITER_SHARD_COUNT: usize = 16;
const TRUSTED_PROXY_COUNT: usize = 0;
const MAX_BODY_BYTES: usize = 1024 * 1024;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 10;

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window_minutes: u64,
    pub rate_limiter_shard_count: usize,
    pub trusted_proxy_count: usize,
    pub max_body_bytes: usize,
    pub http_concurrency_limit: usize,
    pub shutdown_grace_period_secs: u64,
    /// Normalized level name: "debug", "info", "warn" or "error"
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Map a LOG_LEVEL value onto a tracing level name. Unknown values fall back to info.
pub fn normalize_log_level(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" | "WARNING" => "warn",
        "ERROR" => "error",
        _ => "info",
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + ToString,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .unwrap_or(default)
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, then validate it
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .or_else(|| lookup("ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_else(|| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let config = Config {
            host: lookup("HOST").unwrap_or_else(|| HOST.to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| PORT.to_string())
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DATABASE_URL.to_string()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS).max(1),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            cors_origins,
            rate_limit_max: parse_or(&lookup, "RATE_LIMIT_MAX", RATE_LIMIT_MAX),
            rate_limit_window_minutes: parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_MINUTES",
                RATE_LIMIT_WINDOW_MINUTES,
            ),
            rate_limiter_shard_count: parse_or(
                &lookup,
                "RATE_LIMITER_SHARD_COUNT",
                RATE_LIMITER_SHARD_COUNT,
            )
            .max(1),
            trusted_proxy_count: parse_or(&lookup, "TRUSTED_PROXY_COUNT", TRUSTED_PROXY_COUNT),
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", MAX_BODY_BYTES),
            http_concurrency_limit: parse_or(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )
            .max(1),
            shutdown_grace_period_secs: parse_or(
                &lookup,
                "SHUTDOWN_GRACE_PERIOD_SECS",
                SHUTDOWN_GRACE_PERIOD_SECS,
            ),
            log_level: normalize_log_level(&lookup("LOG_LEVEL").unwrap_or_default()).to_string(),
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a SQLite connection string (sqlite:...)"
            ));
        }

        if self.rate_limit_max == 0 {
            return Err(anyhow::anyhow!("RATE_LIMIT_MAX must be greater than zero"));
        }

        if self.rate_limit_window_minutes == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_WINDOW_MINUTES must be greater than zero"
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "ALLOWED_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rate limit window length in seconds
    pub fn rate_limit_window_seconds(&self) -> u64 {
        self.rate_limit_window_minutes.saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window_seconds(), 60);
        assert_eq!(config.shutdown_grace_period_secs, 10);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let config = config_from(&[(
            "ALLOWED_ORIGINS",
            " https://a.example.com , https://b.example.com,, ",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
    }

    #[test]
    fn test_wildcard_origin_rejected_in_production() {
        let err = config_from(&[("ENVIRONMENT", "production"), ("ALLOWED_ORIGINS", "*")])
            .unwrap_err();
        assert!(err.to_string().contains("ALLOWED_ORIGINS"));

        let config = config_from(&[("ALLOWED_ORIGINS", "*")]).unwrap();
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_env_fallback_chain() {
        let config = config_from(&[("ENV", "prod")]).unwrap();
        assert!(config.is_production());

        let config = config_from(&[("APP_ENV", "staging"), ("ENV", "prod")]).unwrap();
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("RATE_LIMIT_MAX", "lots"),
            ("RATE_LIMIT_WINDOW_MINUTES", "5"),
        ])
        .unwrap();
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window_seconds(), 300);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        assert!(config_from(&[("RATE_LIMIT_MAX", "0")]).is_err());
    }

    #[test]
    fn test_non_sqlite_url_rejected() {
        assert!(config_from(&[("DATABASE_URL", "postgresql://localhost/todos")]).is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(normalize_log_level("DEBUG"), "debug");
        assert_eq!(normalize_log_level("warning"), "warn");
        assert_eq!(normalize_log_level("WARN"), "warn");
        assert_eq!(normalize_log_level("Error"), "error");
        assert_eq!(normalize_log_level("verbose"), "info");
        assert_eq!(normalize_log_level(""), "info");
    }
}
