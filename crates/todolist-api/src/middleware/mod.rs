pub mod rate_limit;
pub mod recovery;
pub mod request_log;

pub use rate_limit::{rate_limit_middleware, HttpRateLimiter};
pub use recovery::recovery_middleware;
pub use request_log::request_log_middleware;
pub use todolist_infra::{request_id_middleware, security_headers_middleware};
