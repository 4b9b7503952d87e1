//! Todolist Core Library
//!
//! This crate provides the domain model, error types, configuration, and validation
//! shared by the store and the HTTP API.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use error::{AppError, ErrorMetadata, LogLevel};

/// Service version reported by the health endpoint and startup logs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
