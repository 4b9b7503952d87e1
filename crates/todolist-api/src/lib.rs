//! Todolist API Library
//!
//! HTTP handlers, middleware and application setup for the todo service.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::ErrorResponse;
pub use state::AppState;
