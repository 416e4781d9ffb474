//! Repository trait for todo items.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Todo, TodoId, UserId};

/// Repository trait for todo persistence.
///
/// Every method is a single statement against the store; there is no
/// transaction spanning two calls.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a new todo.
    ///
    /// Stores `userID`, `title`, `color` and `description`. The id generated by
    /// the store is written back into `todo.id`; other store-managed fields are
    /// left untouched, re-fetch the todo to read them.
    ///
    /// # Errors
    /// * `RepositoryError::ValidationError` - if `userID` or `title` is absent
    /// * `RepositoryError::ConstraintViolation` - if the store rejects the row
    async fn create_todo(&self, todo: &mut Todo) -> RepositoryResult<()>;

    /// Overwrite `title`, `color`, `description` and `isFinished` of an
    /// existing todo and stamp `lastEditedAt` with the current time.
    ///
    /// # Errors
    /// * `RepositoryError::NotFound` - if no row has `todo.id`
    async fn update_todo(&self, todo: &Todo) -> RepositoryResult<()>;

    /// Point lookup by id. Soft-deleted todos are returned as well.
    ///
    /// # Errors
    /// * `RepositoryError::NotFound` - if no row has `todo_id`
    async fn get_todo_by_id(&self, todo_id: TodoId) -> RepositoryResult<Todo>;

    /// All non-deleted todos owned by `user_id`, most recently created first.
    ///
    /// Returns an empty vector when the user has none.
    async fn list_todos_by_user_id(&self, user_id: &UserId) -> RepositoryResult<Vec<Todo>>;

    /// Soft-delete a todo.
    ///
    /// # Returns
    /// * `Ok(true)` - the todo was active and is now deleted
    /// * `Ok(false)` - the todo was already deleted or never existed
    async fn delete_todo(&self, todo_id: TodoId) -> RepositoryResult<bool>;
}
