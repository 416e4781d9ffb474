//! Domain model for todo items.
//!
//! - [`todo`]: the [`Todo`] entity, its identifiers and the create/update validators
//! - [`patch`]: partial-update bodies applied field by field

pub mod patch;
pub mod todo;

pub use patch::{FieldChange, TodoPatch};
pub use todo::{
    Todo, TodoId, UserId, ValidationError, DEFAULT_COLOR, DEFAULT_DESCRIPTION,
};
