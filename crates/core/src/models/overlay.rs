use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{course::CourseId, item::ItemId, user::UserId};

pub const MAX_TODO_LENGTH: usize = 500;
pub const MAX_NOTE_LENGTH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub user_id: UserId,
    pub course_id: Option<CourseId>,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub course_id: Option<CourseId>,
    pub text: String,
}

/// A user note. `item_id` is set for notes attached to one assignment or quiz;
/// there is at most one such note per user and item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: UserId,
    pub course_id: Option<CourseId>,
    pub item_id: Option<ItemId>,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub course_id: Option<CourseId>,
    pub item_id: Option<ItemId>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteKind {
    #[default]
    Any,
    ItemNotes,
    General,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub course_id: Option<CourseId>,
    pub kind: NoteKind,
    pub query: Option<String>,
}
