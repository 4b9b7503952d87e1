pub mod todo;

pub use todo::{CreateTodoRequest, FieldUpdate, NewTodo, Todo, TodoChanges, UpdateTodoRequest};
