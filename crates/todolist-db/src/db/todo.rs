use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use todolist_core::{
    models::{NewTodo, Todo, TodoChanges},
    AppError,
};

const TODO_COLUMNS: &str = "id, text, completed, created_at, updated_at";

/// Storage operations for todos.
///
/// Absence is reported as `Ok(None)` / `Ok(false)` rather than an error so callers
/// can tell "not found" apart from a failing store.
#[async_trait::async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, newest first
    async fn list(&self) -> Result<Vec<Todo>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Todo>, AppError>;

    async fn create(&self, todo: NewTodo) -> Result<Todo, AppError>;

    /// Apply the given changes and return the record as stored afterwards.
    /// Empty changes leave the record untouched.
    async fn update(&self, id: i64, changes: &TodoChanges) -> Result<Option<Todo>, AppError>;

    /// Returns `false` when no record had this id
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<(), AppError>;
}

/// SQLite-backed todo repository
#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl TodoStore for TodoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "todos", db.operation = "select"))]
    async fn list(&self) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<Sqlite, Todo>(&format!(
            "SELECT {} FROM todos ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "todos", db.operation = "select", db.record_id = id))]
    async fn get(&self, id: i64) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<Sqlite, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = ?",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    #[tracing::instrument(skip(self, todo), fields(db.table = "todos", db.operation = "insert"))]
    async fn create(&self, todo: NewTodo) -> Result<Todo, AppError> {
        let now = Utc::now();
        let todo = sqlx::query_as::<Sqlite, Todo>(&format!(
            r#"
            INSERT INTO todos (text, completed, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING {}
            "#,
            TODO_COLUMNS
        ))
        .bind(&todo.text)
        .bind(todo.completed)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "todos", db.operation = "update", db.record_id = id))]
    async fn update(&self, id: i64, changes: &TodoChanges) -> Result<Option<Todo>, AppError> {
        let select = format!("SELECT {} FROM todos WHERE id = ?", TODO_COLUMNS);

        // The write and the read-back share one transaction so the returned
        // record is exactly what this update produced.
        let mut tx = self.pool.begin().await?;

        if !changes.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new("UPDATE todos SET ");
            let mut assignments = builder.separated(", ");
            if let Some(text) = &changes.text {
                assignments.push("text = ");
                assignments.push_bind_unseparated(text.clone());
            }
            if let Some(completed) = changes.completed {
                assignments.push("completed = ");
                assignments.push_bind_unseparated(completed);
            }
            assignments.push("updated_at = ");
            assignments.push_bind_unseparated(Utc::now());
            builder.push(" WHERE id = ");
            builder.push_bind(id);

            let result = builder.build().execute(&mut *tx).await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(None);
            }
        }

        let todo = sqlx::query_as::<Sqlite, Todo>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(todo)
    }

    #[tracing::instrument(skip(self), fields(db.table = "todos", db.operation = "delete", db.record_id = id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
