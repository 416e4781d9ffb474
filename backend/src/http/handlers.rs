//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. Failures are logged with the request's
//! operation, user id and todo id before being translated into a response.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::dto::{
    CreateTodoRequest, DeleteResponse, HealthResponse, TodoListResponse, VersionResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Todo, TodoId, TodoPatch, UserId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Identifies the request a failure belongs to in the logs.
struct RequestScope<'a> {
    operation: &'static str,
    user_id: &'a str,
    todo_id: Option<&'a str>,
}

impl<'a> RequestScope<'a> {
    fn new(operation: &'static str, user_id: &'a str) -> Self {
        Self {
            operation,
            user_id,
            todo_id: None,
        }
    }

    fn with_todo(mut self, todo_id: &'a str) -> Self {
        self.todo_id = Some(todo_id);
        self
    }

    fn reject(&self, error: AppError) -> AppError {
        warn!(
            operation = self.operation,
            user_id = self.user_id,
            todo_id = self.todo_id.unwrap_or_default(),
            status = error.status().as_u16(),
            error = %error,
            "request failed"
        );
        error
    }

    fn parse_todo_id(&self) -> Result<TodoId, AppError> {
        let raw = self.todo_id.unwrap_or_default();
        raw.parse()
            .map_err(|e| self.reject(AppError::bad_request("invalid todo id", e)))
    }

    fn decode<T: DeserializeOwned>(&self, body: &Bytes) -> Result<T, AppError> {
        serde_json::from_slice(body)
            .map_err(|e| self.reject(AppError::bad_request("could not decode parameters", e)))
    }
}

// =============================================================================
// Service info
// =============================================================================

/// GET / and GET /version
pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(state.version.as_ref().clone())
}

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.version.clone(),
        database: db_status,
    }))
}

// =============================================================================
// Todo CRUD
// =============================================================================

/// POST /users/{user_id}/todos
///
/// Create a todo owned by the path user. Absent `color` and `description`
/// default to `"#FFFFFF"` and `""`.
pub async fn create_todo(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let scope = RequestScope::new("create_todo", &user_id);
    let request: CreateTodoRequest = scope.decode(&body)?;

    let draft = Todo::draft(
        UserId::new(user_id.as_str()),
        request.title,
        request.color,
        request.description,
    );
    let created = db_services::create_todo(state.repository.as_ref(), draft)
        .await
        .map_err(|e| scope.reject(AppError::from_service("Error creating todo.", e)))?;

    info!(user_id = %user_id, todo_id = ?created.id, "todo created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /users/{user_id}/todos
///
/// Active todos of the user, newest first. Always an array, never null.
pub async fn list_todos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> HandlerResult<TodoListResponse> {
    let scope = RequestScope::new("list_todos", &user_id);

    let owner = UserId::new(user_id.as_str());
    let todos = db_services::list_todos(state.repository.as_ref(), &owner)
        .await
        .map_err(|e| scope.reject(AppError::repository("Error getting todos", e)))?;

    info!(user_id = %user_id, todos_amount = todos.len(), "todos returned");
    Ok(Json(TodoListResponse { todos }))
}

/// GET /users/{user_id}/todos/{todo_id}
///
/// Direct lookup by id. Soft-deleted todos are still returned.
pub async fn get_todo(
    State(state): State<AppState>,
    Path((user_id, todo_id)): Path<(String, String)>,
) -> HandlerResult<Todo> {
    let scope = RequestScope::new("get_todo", &user_id).with_todo(&todo_id);
    let id = scope.parse_todo_id()?;

    let todo = db_services::get_todo(state.repository.as_ref(), id)
        .await
        .map_err(|e| scope.reject(AppError::repository("Error getting todo", e)))?;

    info!(user_id = %user_id, todo_id = %todo_id, "todo returned");
    Ok(Json(todo))
}

/// PATCH /users/{user_id}/todos/{todo_id}
///
/// Partial update: each field present in the body replaces the stored value,
/// even when empty. Absent fields are left untouched.
pub async fn update_todo(
    State(state): State<AppState>,
    Path((user_id, todo_id)): Path<(String, String)>,
    body: Bytes,
) -> HandlerResult<Todo> {
    let scope = RequestScope::new("update_todo", &user_id).with_todo(&todo_id);
    let id = scope.parse_todo_id()?;
    let patch: TodoPatch = scope.decode(&body)?;

    let updated = db_services::update_todo(state.repository.as_ref(), id, &patch)
        .await
        .map_err(|e| scope.reject(AppError::from_service("Error updating todo.", e)))?;

    info!(
        user_id = %user_id,
        todo_id = %todo_id,
        fields = ?patch.fields(),
        "todo updated"
    );
    Ok(Json(updated))
}

/// DELETE /users/{user_id}/todos/{todo_id}
///
/// Soft delete. `deleted` is false when the todo was missing or already deleted.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path((user_id, todo_id)): Path<(String, String)>,
) -> HandlerResult<DeleteResponse> {
    let scope = RequestScope::new("delete_todo", &user_id).with_todo(&todo_id);
    let id = scope.parse_todo_id()?;

    let deleted = db_services::delete_todo(state.repository.as_ref(), id)
        .await
        .map_err(|e| scope.reject(AppError::repository("Error deleting todo", e)))?;

    info!(user_id = %user_id, todo_id = %todo_id, deleted, "todo deleted");
    Ok(Json(DeleteResponse { deleted }))
}
