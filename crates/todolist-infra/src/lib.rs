//! Todolist Infrastructure Library
//!
//! Shared infrastructure for the todo service:
//! - Middleware (request ID, security headers)
//! - Telemetry initialization

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

#[cfg(feature = "middleware")]
pub use middleware::{
    get_request_id, request_id_middleware, security_headers_middleware, RequestId,
    REQUEST_ID_HEADER,
};

#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;
