//! Database layer: connection pool and the todo repository

pub mod pool;
pub mod todo;

pub use pool::{connect, connect_in_memory, MIGRATOR};
pub use todo::{TodoRepository, TodoStore};
