//! Repository trait definitions for database operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`todo`]: CRUD operations for todo items
//!
//! Handlers and services only ever see `dyn TodoRepository`, so the Postgres
//! and in-memory backends are interchangeable:
//!
//! ```ignore
//! async fn count_open<R: TodoRepository + ?Sized>(repo: &R, user: &UserId) -> RepositoryResult<usize> {
//!     let todos = repo.list_todos_by_user_id(user).await?;
//!     Ok(todos.iter().filter(|t| t.is_finished != Some(true)).count())
//! }
//! ```

pub mod error;
pub mod todo;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use todo::TodoRepository;
