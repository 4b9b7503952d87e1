//! Todo CRUD handlers
//!
//! Thin axum adapters over `TodoService`. Ids go through `TodoIdPath`, so every
//! malformed id (path rejection or parse failure) produces the same JSON 400,
//! and the id is checked before the body is looked at.

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use crate::error::{HttpAppError, MessageResponse, ValidatedJson};
use crate::state::AppState;
use todolist_core::models::{CreateTodoRequest, Todo, UpdateTodoRequest};
use todolist_core::validation::parse_todo_id;

/// Todo id taken from the `{id}` path segment
#[derive(Debug, Clone, Copy)]
pub struct TodoIdPath(pub i64);

impl<S> FromRequestParts<S> for TodoIdPath
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state).await?;
        Ok(TodoIdPath(parse_todo_id(&raw_id)?))
    }
}

/// List all todos, newest first
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "All todos ordered by creation time, newest first", body = Vec<Todo>),
        (status = 500, description = "Failed to retrieve todos", body = crate::error::ErrorResponse)
    ),
    tag = "todos"
)]
#[tracing::instrument(skip(state))]
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

/// Get a todo by id
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(
        ("id" = i64, Path, description = "Todo id (positive integer)")
    ),
    responses(
        (status = 200, description = "The todo", body = Todo),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to retrieve todo", body = crate::error::ErrorResponse)
    ),
    tag = "todos"
)]
#[tracing::instrument(skip(state))]
pub async fn get_todo(
    State(state): State<Arc<AppState>>,
    TodoIdPath(id): TodoIdPath,
) -> Result<impl IntoResponse, HttpAppError> {
    let todo = state.todos.get(id).await?;
    Ok(Json(todo))
}

/// Create a todo
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Invalid request body or text", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to create todo", body = crate::error::ErrorResponse)
    ),
    tag = "todos"
)]
#[tracing::instrument(skip(state, request))]
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTodoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let todo = state.todos.create(request).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Partially update a todo. Keys missing from the body are left unchanged.
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = i64, Path, description = "Todo id (positive integer)")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo after the update", body = Todo),
        (status = 400, description = "Invalid ID format, request body or text", body = crate::error::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to update todo", body = crate::error::ErrorResponse)
    ),
    tag = "todos"
)]
#[tracing::instrument(skip(state, body))]
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    TodoIdPath(id): TodoIdPath,
    body: Result<ValidatedJson<UpdateTodoRequest>, HttpAppError>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ValidatedJson(request) = body?;
    let todo = state.todos.update(id, request).await?;
    Ok(Json(todo))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = i64, Path, description = "Todo id (positive integer)")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 400, description = "Invalid ID format", body = crate::error::ErrorResponse),
        (status = 404, description = "Todo not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to delete todo", body = crate::error::ErrorResponse)
    ),
    tag = "todos"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    TodoIdPath(id): TodoIdPath,
) -> Result<impl IntoResponse, HttpAppError> {
    state.todos.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}
