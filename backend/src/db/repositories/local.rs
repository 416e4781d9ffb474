//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`TodoRepository`] suitable
//! for unit testing and local development. Rows live in a `HashMap` behind a
//! lock and follow the same rules as the Postgres table: generated UUID ids,
//! store-stamped timestamps, soft deletion.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
use crate::models::{Todo, TodoId, UserId};

/// In-memory local repository.
///
/// # Example
/// ```
/// use todo_service::db::repositories::LocalRepository;
/// use todo_service::db::repository::TodoRepository;
/// use todo_service::models::{Todo, UserId};
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// let mut todo = Todo::draft(UserId::from("u1"), Some("Buy milk".into()), None, None);
/// repo.create_todo(&mut todo).await.unwrap();
///
/// let todos = repo.list_todos_by_user_id(&UserId::from("u1")).await.unwrap();
/// assert_eq!(todos.len(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    todos: HashMap<TodoId, Todo>,
    // Last timestamp handed out, so that creation order is strict
    clock: Option<DateTime<Utc>>,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            todos: HashMap::new(),
            clock: None,
            is_healthy: true,
        }
    }
}

impl LocalData {
    /// Current time, strictly after any timestamp handed out before.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.clock {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.clock = Some(now);
        now
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "local repository marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy, every operation other than `health_check` fails with
    /// a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.todos.clear();
    }

    /// Number of stored todos, soft-deleted ones included.
    pub fn todo_count(&self) -> usize {
        self.data.read().todos.len()
    }
}

#[async_trait]
impl TodoRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_todo(&self, todo: &mut Todo) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.ensure_healthy("create_todo")?;

        let context = || ErrorContext::new("create_todo").with_entity("todo");
        let user_id = todo.user_id.clone().ok_or_else(|| {
            RepositoryError::validation_with_context("userID is required", context())
        })?;
        let title = todo.title.clone().ok_or_else(|| {
            RepositoryError::validation_with_context("title is required", context())
        })?;

        let id = TodoId::new(uuid::Uuid::new_v4());
        let row = Todo {
            id: Some(id),
            user_id: Some(user_id),
            title: Some(title),
            color: todo.color.clone(),
            description: todo.description.clone(),
            is_finished: None,
            created_at: Some(data.now()),
            last_edited_at: None,
            deleted_at: None,
        };
        data.todos.insert(id, row);

        todo.id = Some(id);
        Ok(())
    }

    async fn update_todo(&self, todo: &Todo) -> RepositoryResult<()> {
        let mut data = self.data.write();
        data.ensure_healthy("update_todo")?;

        let id = todo.id.ok_or_else(|| {
            RepositoryError::validation_with_context(
                "todo has no id",
                ErrorContext::new("update_todo").with_entity("todo"),
            )
        })?;
        let title = todo.title.clone().ok_or_else(|| {
            RepositoryError::validation_with_context(
                "title is required",
                ErrorContext::new("update_todo")
                    .with_entity("todo")
                    .with_entity_id(id),
            )
        })?;

        if !data.todos.contains_key(&id) {
            return Err(RepositoryError::not_found_with_context(
                "Todo not found",
                ErrorContext::new("update_todo")
                    .with_entity("todo")
                    .with_entity_id(id),
            ));
        }

        let now = data.now();
        if let Some(row) = data.todos.get_mut(&id) {
            row.title = Some(title);
            row.color = todo.color.clone();
            row.description = todo.description.clone();
            row.is_finished = todo.is_finished;
            row.last_edited_at = Some(now);
        }
        Ok(())
    }

    async fn get_todo_by_id(&self, todo_id: TodoId) -> RepositoryResult<Todo> {
        let data = self.data.read();
        data.ensure_healthy("get_todo_by_id")?;

        data.todos.get(&todo_id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Record not found",
                ErrorContext::new("get_todo_by_id")
                    .with_entity("todo")
                    .with_entity_id(todo_id),
            )
        })
    }

    async fn list_todos_by_user_id(&self, user_id: &UserId) -> RepositoryResult<Vec<Todo>> {
        let data = self.data.read();
        data.ensure_healthy("list_todos_by_user_id")?;

        let mut todos: Vec<Todo> = data
            .todos
            .values()
            .filter(|t| t.user_id.as_ref() == Some(user_id) && !t.is_deleted())
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn delete_todo(&self, todo_id: TodoId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        data.ensure_healthy("delete_todo")?;

        let now = data.now();
        match data.todos.get_mut(&todo_id) {
            Some(row) if !row.is_deleted() => {
                row.deleted_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(user: &str, title: &str) -> Todo {
        let mut todo = Todo::draft(UserId::from(user), Some(title.into()), None, None);
        todo.validate_for_create().unwrap();
        todo
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let repo = LocalRepository::new();
        let mut todo = draft("u1", "Buy milk");
        repo.create_todo(&mut todo).await.unwrap();

        let id = todo.id.expect("id written back");
        assert!(todo.created_at.is_none(), "only the id is written back");

        let stored = repo.get_todo_by_id(id).await.unwrap();
        assert_eq!(stored.title.as_deref(), Some("Buy milk"));
        assert!(stored.created_at.is_some());
        assert!(stored.last_edited_at.is_none());
        assert_eq!(repo.todo_count(), 1);
    }

    #[tokio::test]
    async fn test_create_ignores_is_finished() {
        let repo = LocalRepository::new();
        let mut todo = draft("u1", "Buy milk");
        todo.is_finished = Some(true);
        repo.create_todo(&mut todo).await.unwrap();

        let stored = repo.get_todo_by_id(todo.id.unwrap()).await.unwrap();
        assert_eq!(stored.is_finished, None);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let repo = LocalRepository::new();
        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let mut todo = draft("u1", title);
            repo.create_todo(&mut todo).await.unwrap();
            ids.push(todo.id.unwrap());
        }
        let mut other = draft("u2", "not mine");
        repo.create_todo(&mut other).await.unwrap();

        let listed = repo
            .list_todos_by_user_id(&UserId::from("u1"))
            .await
            .unwrap();
        let titles: Vec<_> = listed.iter().filter_map(|t| t.title.as_deref()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
        assert_eq!(listed[0].id, Some(ids[2]));
    }

    #[tokio::test]
    async fn test_list_empty_for_unknown_user() {
        let repo = LocalRepository::new();
        let listed = repo
            .list_todos_by_user_id(&UserId::from("nobody"))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_update_stamps_last_edited_at() {
        let repo = LocalRepository::new();
        let mut todo = draft("u1", "Buy milk");
        repo.create_todo(&mut todo).await.unwrap();
        let mut stored = repo.get_todo_by_id(todo.id.unwrap()).await.unwrap();

        stored.is_finished = Some(true);
        repo.update_todo(&stored).await.unwrap();

        let updated = repo.get_todo_by_id(todo.id.unwrap()).await.unwrap();
        assert_eq!(updated.is_finished, Some(true));
        assert!(updated.last_edited_at.unwrap() > updated.created_at.unwrap());
        assert_eq!(updated.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = LocalRepository::new();
        let ghost = Todo {
            id: Some(TodoId::new(uuid::Uuid::new_v4())),
            title: Some("ghost".into()),
            ..Default::default()
        };
        let err = repo.update_todo(&ghost).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let repo = LocalRepository::new();
        let mut todo = draft("u1", "Buy milk");
        repo.create_todo(&mut todo).await.unwrap();
        let id = todo.id.unwrap();

        assert!(repo.delete_todo(id).await.unwrap());
        assert!(!repo.delete_todo(id).await.unwrap());
        assert!(!repo
            .delete_todo(TodoId::new(uuid::Uuid::new_v4()))
            .await
            .unwrap());

        assert!(repo
            .list_todos_by_user_id(&UserId::from("u1"))
            .await
            .unwrap()
            .is_empty());
        // Direct lookups still see the row
        assert!(repo.get_todo_by_id(id).await.unwrap().is_deleted());
        assert_eq!(repo.todo_count(), 1);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo
            .list_todos_by_user_id(&UserId::from("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));

        repo.set_healthy(true);
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear() {
        let repo = LocalRepository::new();
        let mut todo = draft("u1", "Buy milk");
        repo.create_todo(&mut todo).await.unwrap();
        repo.clear();
        assert_eq!(repo.todo_count(), 0);
    }
}
