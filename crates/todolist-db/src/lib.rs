//! Todolist Database Library
//!
//! Record store for todos: the `TodoStore` abstraction and its SQLite implementation.

pub mod db;

pub use db::{connect, connect_in_memory, TodoRepository, TodoStore, MIGRATOR};
