//! The todo entity and its field-level validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Color assigned at creation when the caller does not provide one.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Description assigned at creation when the caller does not provide one.
pub const DEFAULT_DESCRIPTION: &str = "";

/// Store-generated identifier of a todo.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub Uuid);

impl TodoId {
    pub fn new(value: Uuid) -> Self {
        TodoId(value)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for TodoId {
    fn from(v: Uuid) -> Self {
        TodoId(v)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TodoId)
    }
}

/// Identifier of the user owning a todo.
///
/// Taken verbatim from the request path; no authentication ties a request to it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        UserId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(v: &str) -> Self {
        UserId(v.to_string())
    }
}

impl From<String> for UserId {
    fn from(v: String) -> Self {
        UserId(v)
    }
}

/// A required field was absent or empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} is required")]
pub struct ValidationError {
    /// Wire name of the offending field
    pub field: &'static str,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// A todo item owned by a single user.
///
/// Store-managed fields (`id`, `created_at`, `last_edited_at`, `deleted_at`) are
/// `None` until the entity has been persisted. `deleted_at` never leaves the
/// service: soft deletion is an internal concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    #[serde(rename = "userID")]
    pub user_id: Option<UserId>,
    pub title: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub is_finished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Build an unsaved todo for `user_id` from caller-supplied fields.
    pub fn draft(
        user_id: UserId,
        title: Option<String>,
        color: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            title,
            color,
            description,
            ..Default::default()
        }
    }

    /// Check the fields required to create a todo and fill creation defaults.
    ///
    /// Fails when `userID` or `title` is absent or empty. On success, an absent
    /// `color` becomes [`DEFAULT_COLOR`] and an absent `description` becomes
    /// [`DEFAULT_DESCRIPTION`]. Present-but-empty values are kept as they are.
    pub fn validate_for_create(&mut self) -> Result<(), ValidationError> {
        if self.user_id.as_ref().map_or(true, UserId::is_empty) {
            return Err(ValidationError::missing("userID"));
        }
        if is_blank(&self.title) {
            return Err(ValidationError::missing("title"));
        }

        self.color.get_or_insert_with(|| DEFAULT_COLOR.to_string());
        self.description
            .get_or_insert_with(|| DEFAULT_DESCRIPTION.to_string());

        Ok(())
    }

    /// Check that every field needed for a full replace is present.
    ///
    /// Stricter than [`Todo::validate_for_create`]: `color` and `description`
    /// must be non-empty, and `isFinished` and `lastEditedAt` must be set. The
    /// PATCH endpoint merges fields instead and never calls this.
    pub fn validate_for_update(&self) -> Result<(), ValidationError> {
        if self.user_id.as_ref().map_or(true, UserId::is_empty) {
            return Err(ValidationError::missing("userID"));
        }
        if is_blank(&self.title) {
            return Err(ValidationError::missing("title"));
        }
        if is_blank(&self.color) {
            return Err(ValidationError::missing("color"));
        }
        if is_blank(&self.description) {
            return Err(ValidationError::missing("description"));
        }
        if self.is_finished.is_none() {
            return Err(ValidationError::missing("isFinished"));
        }
        if self.last_edited_at.is_none() {
            return Err(ValidationError::missing("lastEditedAt"));
        }
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_todo() -> Todo {
        Todo {
            id: Some(TodoId::new(uuid::Uuid::new_v4())),
            user_id: Some(UserId::from("u1")),
            title: Some("Buy milk".to_string()),
            color: Some("#000000".to_string()),
            description: Some("2 litres".to_string()),
            is_finished: Some(false),
            created_at: Some(Utc::now()),
            last_edited_at: Some(Utc::now()),
            deleted_at: None,
        }
    }

    #[test]
    fn test_create_fills_defaults() {
        let mut todo = Todo::draft(UserId::from("u1"), Some("Buy milk".into()), None, None);
        todo.validate_for_create().unwrap();
        assert_eq!(todo.color.as_deref(), Some(DEFAULT_COLOR));
        assert_eq!(todo.description.as_deref(), Some(DEFAULT_DESCRIPTION));
        assert_eq!(todo.is_finished, None);
    }

    #[test]
    fn test_create_keeps_supplied_values() {
        let mut todo = Todo::draft(
            UserId::from("u1"),
            Some("Buy milk".into()),
            Some("".into()),
            Some("semi-skimmed".into()),
        );
        todo.validate_for_create().unwrap();
        assert_eq!(todo.color.as_deref(), Some(""));
        assert_eq!(todo.description.as_deref(), Some("semi-skimmed"));
    }

    #[test]
    fn test_create_requires_title() {
        let mut missing = Todo::draft(UserId::from("u1"), None, None, None);
        assert_eq!(
            missing.validate_for_create(),
            Err(ValidationError::missing("title"))
        );
        // No defaults are filled when validation fails
        assert!(missing.color.is_none());

        let mut empty = Todo::draft(UserId::from("u1"), Some(String::new()), None, None);
        assert_eq!(
            empty.validate_for_create().unwrap_err().to_string(),
            "title is required"
        );
    }

    #[test]
    fn test_create_requires_user_id() {
        let mut todo = Todo {
            title: Some("Buy milk".into()),
            ..Default::default()
        };
        assert_eq!(
            todo.validate_for_create(),
            Err(ValidationError::missing("userID"))
        );

        let mut empty = Todo::draft(UserId::from(""), Some("Buy milk".into()), None, None);
        assert_eq!(
            empty.validate_for_create(),
            Err(ValidationError::missing("userID"))
        );
    }

    #[test]
    fn test_update_validator_accepts_complete_todo() {
        assert!(complete_todo().validate_for_update().is_ok());
    }

    #[test]
    fn test_update_validator_is_stricter_than_create() {
        let mut todo = complete_todo();
        todo.description = Some(String::new());
        assert_eq!(
            todo.validate_for_update(),
            Err(ValidationError::missing("description"))
        );

        let mut todo = complete_todo();
        todo.is_finished = None;
        assert_eq!(
            todo.validate_for_update(),
            Err(ValidationError::missing("isFinished"))
        );

        let mut todo = complete_todo();
        todo.last_edited_at = None;
        assert_eq!(
            todo.validate_for_update(),
            Err(ValidationError::missing("lastEditedAt"))
        );

        let mut todo = complete_todo();
        todo.color = None;
        assert_eq!(
            todo.validate_for_update(),
            Err(ValidationError::missing("color"))
        );
    }

    #[test]
    fn test_wire_format() {
        let mut todo = complete_todo();
        todo.deleted_at = Some(Utc::now());
        let value = serde_json::to_value(&todo).unwrap();

        assert_eq!(value["userID"], "u1");
        assert_eq!(value["isFinished"], false);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("lastEditedAt").is_some());
        assert!(value.get("deletedAt").is_none());
        assert_eq!(
            value["id"].as_str().unwrap(),
            todo.id.unwrap().to_string()
        );
    }

    #[test]
    fn test_unsaved_todo_omits_store_fields() {
        let todo = Todo::draft(UserId::from("u1"), Some("x".into()), None, None);
        let value = serde_json::to_value(&todo).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("createdAt").is_none());
        assert!(value["isFinished"].is_null());
    }

    #[test]
    fn test_todo_id_from_str() {
        let raw = "6f1c2b1e-3c4d-4e5f-8a9b-0c1d2e3f4a5b";
        let id: TodoId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert!("not-a-uuid".parse::<TodoId>().is_err());
    }
}
