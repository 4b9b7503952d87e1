//! Todo operations, independent of the HTTP framework
//!
//! Each operation validates its input, calls the store once, maps the outcome to
//! a success value or a single `AppError`, and emits one summary log record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use todolist_core::models::{CreateTodoRequest, NewTodo, Todo, UpdateTodoRequest};
use todolist_core::AppError;
use todolist_db::TodoStore;
use validator::Validate;

use crate::constants::SLOW_THRESHOLD;

pub const NOT_FOUND_MESSAGE: &str = "Todo not found";

/// Report how long an operation took, with a separate warning when it was slow
fn observe(operation: &'static str, start: Instant) -> Duration {
    let duration = start.elapsed();
    if duration > SLOW_THRESHOLD {
        tracing::warn!(
            operation,
            duration_ms = duration.as_millis() as u64,
            "Slow operation detected"
        );
    }
    duration
}

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND_MESSAGE.to_string())
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, AppError> {
        let start = Instant::now();
        let todos = self
            .store
            .list()
            .await
            .map_err(|e| AppError::store_failure("Failed to retrieve todos", e))?;

        let duration = observe("list_todos", start);
        tracing::info!(
            count = todos.len(),
            duration_ms = duration.as_millis() as u64,
            "Todos retrieved"
        );
        Ok(todos)
    }

    pub async fn get(&self, id: i64) -> Result<Todo, AppError> {
        let start = Instant::now();
        let todo = self
            .store
            .get(id)
            .await
            .map_err(|e| AppError::store_failure("Failed to retrieve todo", e))?
            .ok_or_else(not_found)?;

        let duration = observe("get_todo", start);
        tracing::info!(id, duration_ms = duration.as_millis() as u64, "Todo retrieved");
        Ok(todo)
    }

    pub async fn create(&self, request: CreateTodoRequest) -> Result<Todo, AppError> {
        let start = Instant::now();
        request.validate()?;

        let todo = self
            .store
            .create(NewTodo::from(request))
            .await
            .map_err(|e| AppError::store_failure("Failed to create todo", e))?;

        let duration = observe("create_todo", start);
        tracing::info!(
            id = todo.id,
            text_length = todo.text.chars().count(),
            duration_ms = duration.as_millis() as u64,
            "Todo created"
        );
        Ok(todo)
    }

    /// Partial update: only fields present in the request are written.
    pub async fn update(&self, id: i64, request: UpdateTodoRequest) -> Result<Todo, AppError> {
        let start = Instant::now();
        request.validate()?;

        let changes = request.into_changes();
        let todo = self
            .store
            .update(id, &changes)
            .await
            .map_err(|e| AppError::store_failure("Failed to update todo", e))?
            .ok_or_else(not_found)?;

        let duration = observe("update_todo", start);
        tracing::info!(
            id,
            text_changed = changes.text.is_some(),
            completed_changed = changes.completed.is_some(),
            duration_ms = duration.as_millis() as u64,
            "Todo updated"
        );
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let start = Instant::now();
        let deleted = self
            .store
            .delete(id)
            .await
            .map_err(|e| AppError::store_failure("Failed to delete todo", e))?;
        if !deleted {
            return Err(not_found());
        }

        let duration = observe("delete_todo", start);
        tracing::info!(id, duration_ms = duration.as_millis() as u64, "Todo deleted");
        Ok(())
    }

    /// Whether the store currently answers queries
    pub async fn store_available(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
