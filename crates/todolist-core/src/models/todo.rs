use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::validation::{sanitize_text, validate_todo_text};

/// A single todo item as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a todo
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTodoRequest {
    #[validate(custom(function = "validate_todo_text"))]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// One field of a partial update.
///
/// `Absent` means the key was missing from the body, `Null` means it was sent as
/// JSON `null` and `Set` carries a new value. Use with `#[serde(default)]` so a
/// missing key deserializes to `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldUpdate::Absent)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Null,
        })
    }
}

/// Request DTO for partially updating a todo
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub text: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub completed: FieldUpdate<bool>,
}

fn null_field_error(field: &'static str) -> ValidationError {
    let mut error = ValidationError::new("null");
    error.message = Some(format!("Invalid input: {} cannot be null", field).into());
    error
}

impl Validate for UpdateTodoRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match &self.text {
            FieldUpdate::Absent => {}
            FieldUpdate::Null => errors.add("text", null_field_error("text")),
            FieldUpdate::Set(text) => {
                if let Err(e) = validate_todo_text(text) {
                    errors.add("text", e);
                }
            }
        }

        if self.completed == FieldUpdate::Null {
            errors.add("completed", null_field_error("completed"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl UpdateTodoRequest {
    /// Collect the fields that carry a new value. Text is sanitized here, so the
    /// result is ready to hand to the store.
    pub fn into_changes(self) -> TodoChanges {
        TodoChanges {
            text: self.text.as_set().map(|text| sanitize_text(text)),
            completed: self.completed.as_set().copied(),
        }
    }
}

/// The set of columns a partial update writes. Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none()
    }
}

/// A sanitized todo ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub completed: bool,
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(request: CreateTodoRequest) -> Self {
        NewTodo {
            text: sanitize_text(&request.text),
            completed: request.completed,
        }
    }
}
