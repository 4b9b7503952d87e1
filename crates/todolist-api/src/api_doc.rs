//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use todolist_core::models;

/// The OpenAPI document with the running crate version filled in
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.version = todolist_core::VERSION.to_string();
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todolist API",
        description = "CRUD API for todo items. Todo text is trimmed for validation, limited to 500 characters and HTML-escaped before storage."
    ),
    paths(
        handlers::todos::list_todos,
        handlers::todos::get_todo,
        handlers::todos::create_todo,
        handlers::todos::update_todo,
        handlers::todos::delete_todo,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Todo,
            models::CreateTodoRequest,
            models::UpdateTodoRequest,
            error::ErrorResponse,
            error::MessageResponse,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "todos", description = "Todo management"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let spec = get_openapi_spec();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/todos"));
        assert!(paths.iter().any(|p| *p == "/api/todos/{id}"));
        assert!(paths.iter().any(|p| *p == "/health"));
        assert_eq!(spec.info.version, todolist_core::VERSION);
    }

    #[test]
    fn test_openapi_registers_schemas() {
        let spec = get_openapi_spec();
        let schemas = spec.components.expect("components").schemas;
        for name in ["Todo", "CreateTodoRequest", "UpdateTodoRequest", "ErrorResponse"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }
}
