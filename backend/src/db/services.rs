//! High-level todo service layer.
//!
//! These functions hold the rules every storage backend shares: validation
//! before a write, merge-before-update for partial edits, and re-reading the
//! stored row so callers see store-assigned fields (`id`, timestamps).
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  HTTP handlers (http/handlers.rs)            │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │  Service layer (services.rs)                 │
//! │  - create validation and defaults            │
//! │  - patch merge                               │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │  TodoRepository (repository/todo.rs)         │
//! └──────────┬───────────────────────┬───────────┘
//!            │                       │
//! ┌──────────▼─────────┐  ┌──────────▼─────────┐
//! │ PostgresRepository │  │ LocalRepository    │
//! └────────────────────┘  └────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use todo_service::db::{repositories::LocalRepository, services};
//! use todo_service::models::{Todo, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let draft = Todo::draft(UserId::from("u1"), Some("Buy milk".into()), None, None);
//!
//!     let created = services::create_todo(&repo, draft).await?;
//!     let todos = services::list_todos(&repo, &UserId::from("u1")).await?;
//!     println!("created {:?}, user has {} todos", created.id, todos.len());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
use crate::models::{Todo, TodoId, TodoPatch, UserId, ValidationError};

/// Errors surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Check if the backing store is reachable.
pub async fn health_check<R: TodoRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Validate a new todo, persist it and return the stored row.
///
/// Absent `color` and `description` are filled with their creation defaults.
/// Nothing is written when validation fails.
pub async fn create_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    mut todo: Todo,
) -> ServiceResult<Todo> {
    todo.validate_for_create()?;
    repo.create_todo(&mut todo).await?;

    let id = todo.id.ok_or_else(|| {
        RepositoryError::internal_with_context(
            "store did not return an id for the new todo",
            ErrorContext::new("create_todo").with_entity("todo"),
        )
    })?;
    info!("Created todo {}", id);

    Ok(repo.get_todo_by_id(id).await?)
}

/// Apply a partial update to a stored todo and return the stored result.
///
/// Present patch fields overwrite the stored values, even when empty; absent
/// fields are left untouched. An empty patch still stamps `lastEditedAt`.
pub async fn update_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    todo_id: TodoId,
    patch: &TodoPatch,
) -> ServiceResult<Todo> {
    let mut todo = repo.get_todo_by_id(todo_id).await?;

    debug!("Patching todo {} fields {:?}", todo_id, patch.fields());
    patch.apply(&mut todo);
    repo.update_todo(&todo).await?;

    Ok(repo.get_todo_by_id(todo_id).await?)
}

/// Fetch one todo by id, soft-deleted rows included.
pub async fn get_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    todo_id: TodoId,
) -> RepositoryResult<Todo> {
    repo.get_todo_by_id(todo_id).await
}

/// List the active todos of a user, newest first.
pub async fn list_todos<R: TodoRepository + ?Sized>(
    repo: &R,
    user_id: &UserId,
) -> RepositoryResult<Vec<Todo>> {
    repo.list_todos_by_user_id(user_id).await
}

/// Soft-delete a todo. Returns `false` when it was missing or already deleted.
pub async fn delete_todo<R: TodoRepository + ?Sized>(
    repo: &R,
    todo_id: TodoId,
) -> RepositoryResult<bool> {
    let deleted = repo.delete_todo(todo_id).await?;
    if deleted {
        info!("Soft-deleted todo {}", todo_id);
    }
    Ok(deleted)
}
