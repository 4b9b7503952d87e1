//! Application state shared by all handlers

use sqlx::SqlitePool;
use std::sync::Arc;
use todolist_core::Config;
use todolist_db::{TodoRepository, TodoStore};

use crate::services::TodoService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub todos: TodoService,
}

impl AppState {
    /// State backed by the SQLite repository on `pool`
    pub fn new(config: Config, pool: SqlitePool) -> Arc<Self> {
        Self::with_store(config, Arc::new(TodoRepository::new(pool)))
    }

    /// State backed by an arbitrary store implementation
    pub fn with_store(config: Config, store: Arc<dyn TodoStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            todos: TodoService::new(store),
        })
    }
}
