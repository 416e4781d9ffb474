//! Partial updates for todo items.
//!
//! A [`TodoPatch`] is the body of a PATCH request. It is flattened into a list
//! of [`FieldChange`]s which are applied one after the other, so every mutable
//! field goes through the same "replace if present" rule.

use serde::{Deserialize, Serialize};

use super::todo::Todo;

/// Fields of a todo a client may change after creation.
///
/// Absent fields are left untouched. A present string field replaces the
/// stored value even when it is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_finished: Option<bool>,
}

/// A single field assignment extracted from a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title(String),
    Color(String),
    Description(String),
    IsFinished(bool),
}

impl FieldChange {
    /// Wire name of the field this change targets.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldChange::Title(_) => "title",
            FieldChange::Color(_) => "color",
            FieldChange::Description(_) => "description",
            FieldChange::IsFinished(_) => "isFinished",
        }
    }

    pub fn apply_to(self, todo: &mut Todo) {
        match self {
            FieldChange::Title(v) => todo.title = Some(v),
            FieldChange::Color(v) => todo.color = Some(v),
            FieldChange::Description(v) => todo.description = Some(v),
            FieldChange::IsFinished(v) => todo.is_finished = Some(v),
        }
    }
}

impl TodoPatch {
    /// The assignments carried by this patch, in field order.
    pub fn changes(&self) -> Vec<FieldChange> {
        let candidates = [
            self.title.clone().map(FieldChange::Title),
            self.color.clone().map(FieldChange::Color),
            self.description.clone().map(FieldChange::Description),
            self.is_finished.map(FieldChange::IsFinished),
        ];
        candidates.into_iter().flatten().collect()
    }

    /// Names of the fields present in this patch.
    pub fn fields(&self) -> Vec<&'static str> {
        self.changes().iter().map(FieldChange::field_name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }

    /// Merge this patch into `todo`.
    pub fn apply(&self, todo: &mut Todo) {
        for change in self.changes() {
            change.apply_to(todo);
        }
    }
}
