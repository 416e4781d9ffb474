use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::todo;
use crate::models::{Todo, TodoId, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = todo)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    pub todo_id: Uuid,
    pub user_id: String,
    pub title: String,
    pub color: Option<String>,
    pub description: Option<String>,
    pub is_finished: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: Some(TodoId::new(row.todo_id)),
            user_id: Some(UserId::new(row.user_id)),
            title: Some(row.title),
            color: row.color,
            description: row.description,
            is_finished: row.is_finished,
            created_at: Some(row.created_at),
            last_edited_at: row.last_edited_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todo)]
pub struct NewTodoRow {
    pub user_id: String,
    pub title: String,
    pub color: Option<String>,
    pub description: Option<String>,
}
