//! Todo/Note overlay: user-owned records shown next to, never mixed into,
//! LMS deadlines.

use std::{cmp::Reverse, sync::Arc};

use uuid::Uuid;

use crate::{
    errors::{BotError, BotResult},
    models::{
        course::{CourseId, CourseMap},
        overlay::{MAX_NOTE_LENGTH, MAX_TODO_LENGTH, NewNote, NewTodo, Note, NoteFilter, NoteKind, Todo},
        user::UserId,
        view::{NoteGroup, TodoGroup},
    },
    store::OverlayStore,
};

fn validate_text(text: &str, what: &str, max: usize) -> BotResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BotError::Validation(format!("{what} text can't be empty.")));
    }
    if text.chars().count() > max {
        return Err(BotError::Validation(format!(
            "{what} is too long (max {max} characters)."
        )));
    }
    Ok(text.to_string())
}

/// Sort key placing named courses alphabetically, then unknown course ids,
/// then the uncategorised group.
fn group_key(course_id: Option<CourseId>, name: &Option<String>) -> (bool, bool, String, CourseId) {
    (
        course_id.is_none(),
        name.is_none(),
        name.as_deref().unwrap_or_default().to_lowercase(),
        course_id.unwrap_or_default(),
    )
}

fn group_by_course<T>(
    records: Vec<T>,
    course_of: impl Fn(&T) -> Option<CourseId>,
    names: Option<&CourseMap>,
) -> Vec<(Option<CourseId>, Option<String>, Vec<T>)> {
    let mut groups: Vec<(Option<CourseId>, Option<String>, Vec<T>)> = Vec::new();
    for record in records {
        let course_id = course_of(&record);
        match groups.iter_mut().find(|(id, _, _)| *id == course_id) {
            Some((_, _, members)) => members.push(record),
            None => {
                let name = course_id
                    .and_then(|id| names.and_then(|map| map.name_of(id)))
                    .map(str::to_string);
                groups.push((course_id, name, vec![record]));
            }
        }
    }
    groups.sort_by_key(|(id, name, _)| group_key(*id, name));
    groups
}

pub struct Overlay {
    store: Arc<dyn OverlayStore>,
}

impl Overlay {
    pub fn new(store: Arc<dyn OverlayStore>) -> Self {
        Self { store }
    }

    pub async fn add_todo(
        &self,
        user: UserId,
        course_id: Option<CourseId>,
        text: &str,
    ) -> BotResult<Todo> {
        let text = validate_text(text, "Todo", MAX_TODO_LENGTH)?;
        self.store.add_todo(user, NewTodo { course_id, text }).await
    }

    /// Todos grouped by course. Active before done, newest first.
    pub async fn todos(
        &self,
        user: UserId,
        include_done: bool,
        names: Option<&CourseMap>,
    ) -> BotResult<Vec<TodoGroup>> {
        let mut todos: Vec<Todo> = self
            .store
            .todos(user, None)
            .await?
            .into_iter()
            .filter(|t| include_done || !t.done)
            .collect();
        todos.sort_by_key(|t| (t.done, Reverse(t.created_at)));

        Ok(group_by_course(todos, |t| t.course_id, names)
            .into_iter()
            .map(|(course_id, course_name, todos)| TodoGroup {
                course_id,
                course_name,
                todos,
            })
            .collect())
    }

    pub async fn toggle_todo(&self, user: UserId, id: Uuid) -> BotResult<Todo> {
        let current = self
            .store
            .todos(user, None)
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| BotError::NotFound("Todo".to_string()))?;

        self.store
            .set_todo_done(user, id, !current.done)
            .await?
            .ok_or_else(|| BotError::NotFound("Todo".to_string()))
    }

    pub async fn delete_todo(&self, user: UserId, id: Uuid) -> BotResult<()> {
        if self.store.delete_todo(user, id).await? {
            Ok(())
        } else {
            Err(BotError::NotFound("Todo".to_string()))
        }
    }

    /// Save a general note, or replace the note attached to `note.item_id`.
    pub async fn save_note(&self, user: UserId, note: NewNote) -> BotResult<Note> {
        let text = validate_text(&note.text, "Note", MAX_NOTE_LENGTH)?;
        self.store.save_note(user, NewNote { text, ..note }).await
    }

    /// Notes matching `filter`, grouped by course, newest first. The search
    /// runs over decrypted text in memory.
    pub async fn notes(
        &self,
        user: UserId,
        filter: &NoteFilter,
        names: Option<&CourseMap>,
    ) -> BotResult<Vec<NoteGroup>> {
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut notes: Vec<Note> = self
            .store
            .notes(user, filter.course_id)
            .await?
            .into_iter()
            .filter(|n| match filter.kind {
                NoteKind::Any => true,
                NoteKind::ItemNotes => n.item_id.is_some(),
                NoteKind::General => n.item_id.is_none(),
            })
            .filter(|n| {
                query
                    .as_deref()
                    .is_none_or(|q| n.text.to_lowercase().contains(q))
            })
            .collect();
        notes.sort_by_key(|n| Reverse(n.updated_at));

        Ok(group_by_course(notes, |n| n.course_id, names)
            .into_iter()
            .map(|(course_id, course_name, notes)| NoteGroup {
                course_id,
                course_name,
                notes,
            })
            .collect())
    }

    pub async fn delete_note(&self, user: UserId, id: Uuid) -> BotResult<()> {
        if self.store.delete_note(user, id).await? {
            Ok(())
        } else {
            Err(BotError::NotFound("Note".to_string()))
        }
    }
}
