//! Structured view data handed to the presentation layer. Nothing here
//! carries platform markup; rendering belongs to the transport crate.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{
    course::{CourseId, RawFile, RawFolder},
    item::Item,
    overlay::{Note, Todo},
};

/// Items due inside a window, split by submission state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingView {
    pub window_days: u32,
    pub pending: Vec<Item>,
    pub submitted: Vec<Item>,
}

impl UpcomingView {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.submitted.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderView {
    pub generated_at: DateTime<FixedOffset>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseItemsView {
    pub course_id: CourseId,
    pub course_name: Option<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileView {
    pub id: i64,
    pub name: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderView {
    pub course_id: CourseId,
    pub course_name: Option<String>,
    pub folder_id: i64,
    pub subfolders: Vec<RawFolder>,
    pub files: Vec<FileView>,
    pub total_files: usize,
}

impl FileView {
    pub fn from_raw(raw: &RawFile, url: String) -> Self {
        Self {
            id: raw.id,
            name: raw.display_name.clone(),
            size: raw.size,
            url,
        }
    }
}

/// Todos sharing one course. `course_id == None` is the uncategorised group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoGroup {
    pub course_id: Option<CourseId>,
    pub course_name: Option<String>,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteGroup {
    pub course_id: Option<CourseId>,
    pub course_name: Option<String>,
    pub notes: Vec<Note>,
}

/// Messages the core pushes to a user outside of a command reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum View {
    Reminder(ReminderView),
    TokenExpired,
    Linked { course_count: usize },
    Broadcast(String),
}

/// Counts shown to the bot administrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: i64,
    pub linked: i64,
    pub reminders_enabled: i64,
    pub notes: i64,
    pub todos: i64,
    pub todos_done: i64,
}
