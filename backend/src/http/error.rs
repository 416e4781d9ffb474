//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::repository::RepositoryError;
use crate::db::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub message: String,
    /// Additional details, `null` when there are none
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid request (undecodable body, bad path id, validation error)
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<Value>,
    },
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
    /// Repository failure; the status code follows the error kind
    #[error("{message}: {source}")]
    Repository {
        message: String,
        source: RepositoryError,
    },
}

impl AppError {
    /// A 400 carrying `{"error": <cause>}` as details.
    pub fn bad_request(message: impl Into<String>, cause: impl ToString) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: Some(json!({ "error": cause.to_string() })),
        }
    }

    /// Wrap a repository failure under a client-facing message.
    pub fn repository(message: impl Into<String>, source: RepositoryError) -> Self {
        AppError::Repository {
            message: message.into(),
            source,
        }
    }

    /// Translate a service failure: validation errors become 400s, repository
    /// errors keep their own mapping under `message`.
    pub fn from_service(message: impl Into<String>, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => AppError::bad_request("Not all fields found", e),
            ServiceError::Repository(e) => AppError::repository(message, e),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Repository { source, .. } => match source {
                RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RepositoryError::ConstraintViolation { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest { message, details } => ApiError { message, details },
            AppError::NotFound(message) => ApiError::new(message),
            // Store internals stay in the logs
            AppError::Repository { message, .. } => ApiError::new(message),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    #[test]
    fn test_repository_status_mapping() {
        let not_found = AppError::repository("Error getting todo", RepositoryError::not_found("x"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = AppError::repository("Error creating todo.", RepositoryError::constraint("dup"));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let internal = AppError::repository("Error creating todo.", RepositoryError::query("boom"));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let down = AppError::repository("Error getting todos", RepositoryError::connection("down"));
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[cfg(feature = "postgres-repo")]
    #[test]
    fn test_malformed_write_is_internal_error() {
        use diesel::result::{DatabaseErrorKind, Error};

        let not_null = RepositoryError::from(Error::DatabaseError(
            DatabaseErrorKind::NotNullViolation,
            Box::new("null value in column \"title\"".to_string()),
        ));
        let err = AppError::from_service("Error creating todo.", ServiceError::Repository(not_null));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::from_service(
            "Error creating todo.",
            ServiceError::Validation(ValidationError::missing("title")),
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            AppError::BadRequest { message, details } => {
                assert_eq!(message, "Not all fields found");
                assert_eq!(details, Some(json!({ "error": "title is required" })));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_serializes_null_details() {
        let body = serde_json::to_value(ApiError::new("Error getting todo")).unwrap();
        assert_eq!(body, json!({ "message": "Error getting todo", "details": null }));
    }
}
