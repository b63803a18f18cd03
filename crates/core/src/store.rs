//! Storage contracts the core depends on. `duebot-db` provides the SQLite
//! implementation; [`MemoryStore`] backs tests and local experiments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    errors::{BotError, BotResult},
    models::{
        course::CourseId,
        overlay::{NewNote, NewTodo, Note, Todo},
        user::{
            AccessToken, CipherScheme, Credential, CredentialStatus, DEFAULT_REMINDER_HOUR,
            ReminderSetting, UserId,
        },
        view::AdminStats,
    },
};

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user: UserId) -> BotResult<Option<Credential>>;

    /// Encrypt and store `token`, replacing any previous credential and
    /// clearing the invalid flag.
    async fn put(&self, user: UserId, token: &AccessToken) -> BotResult<()>;

    async fn mark_invalid(&self, user: UserId) -> BotResult<()>;

    /// Drop the credential only. Returns whether one existed.
    async fn revoke(&self, user: UserId) -> BotResult<bool>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn reminder(&self, user: UserId) -> BotResult<Option<ReminderSetting>>;

    /// Upsert hour and enabled flag. `last_fired_on` is preserved.
    async fn set_reminder(&self, user: UserId, hour: u8, enabled: bool)
    -> BotResult<ReminderSetting>;

    /// Create the default setting if the user has none yet.
    async fn ensure_default_reminder(&self, user: UserId) -> BotResult<()>;

    /// Users with reminders enabled at `hour`, a valid credential, and no
    /// firing recorded for `today`.
    async fn due_reminders(&self, hour: u8, today: NaiveDate) -> BotResult<Vec<UserId>>;

    /// Record today's firing. Returns false if it was already recorded.
    async fn claim_firing(&self, user: UserId, today: NaiveDate) -> BotResult<bool>;
}

#[async_trait]
pub trait OverlayStore: Send + Sync {
    async fn add_todo(&self, user: UserId, todo: NewTodo) -> BotResult<Todo>;

    async fn todos(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Todo>>;

    async fn set_todo_done(&self, user: UserId, id: Uuid, done: bool) -> BotResult<Option<Todo>>;

    async fn delete_todo(&self, user: UserId, id: Uuid) -> BotResult<bool>;

    /// Notes with an `item_id` are upserted per user and item.
    async fn save_note(&self, user: UserId, note: NewNote) -> BotResult<Note>;

    async fn notes(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Note>>;

    async fn delete_note(&self, user: UserId, id: Uuid) -> BotResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user record on first interaction.
    async fn touch_user(&self, user: UserId) -> BotResult<()>;

    async fn all_users(&self) -> BotResult<Vec<UserId>>;

    async fn stats(&self) -> BotResult<AdminStats>;

    /// Hard delete of every record for `user`.
    async fn purge(&self, user: UserId) -> BotResult<()>;
}

#[derive(Default)]
struct MemoryState {
    users: Vec<UserId>,
    credentials: HashMap<UserId, Credential>,
    reminders: HashMap<UserId, ReminderSetting>,
    todos: Vec<Todo>,
    notes: Vec<Note>,
}

/// In-process store implementing every storage trait. Nothing is encrypted.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, user: UserId) -> BotResult<Option<Credential>> {
        Ok(self.state.lock().await.credentials.get(&user).cloned())
    }

    async fn put(&self, user: UserId, token: &AccessToken) -> BotResult<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains(&user) {
            state.users.push(user);
        }
        state.credentials.insert(
            user,
            Credential {
                user_id: user,
                token: token.clone(),
                scheme: CipherScheme::Fernet,
                status: CredentialStatus::Valid,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn mark_invalid(&self, user: UserId) -> BotResult<()> {
        if let Some(credential) = self.state.lock().await.credentials.get_mut(&user) {
            credential.status = CredentialStatus::Invalid;
        }
        Ok(())
    }

    async fn revoke(&self, user: UserId) -> BotResult<bool> {
        Ok(self.state.lock().await.credentials.remove(&user).is_some())
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn reminder(&self, user: UserId) -> BotResult<Option<ReminderSetting>> {
        Ok(self.state.lock().await.reminders.get(&user).cloned())
    }

    async fn set_reminder(
        &self,
        user: UserId,
        hour: u8,
        enabled: bool,
    ) -> BotResult<ReminderSetting> {
        if hour > 23 {
            return Err(BotError::Validation("Hour must be between 0 and 23.".to_string()));
        }
        let mut state = self.state.lock().await;
        let setting = state.reminders.entry(user).or_insert(ReminderSetting {
            user_id: user,
            hour,
            enabled,
            last_fired_on: None,
        });
        setting.hour = hour;
        setting.enabled = enabled;
        Ok(setting.clone())
    }

    async fn ensure_default_reminder(&self, user: UserId) -> BotResult<()> {
        self.state
            .lock()
            .await
            .reminders
            .entry(user)
            .or_insert(ReminderSetting {
                user_id: user,
                hour: DEFAULT_REMINDER_HOUR,
                enabled: true,
                last_fired_on: None,
            });
        Ok(())
    }

    async fn due_reminders(&self, hour: u8, today: NaiveDate) -> BotResult<Vec<UserId>> {
        let state = self.state.lock().await;
        let mut users: Vec<UserId> = state
            .reminders
            .values()
            .filter(|r| r.enabled && r.hour == hour && r.last_fired_on != Some(today))
            .filter(|r| state.credentials.get(&r.user_id).is_some_and(Credential::is_valid))
            .map(|r| r.user_id)
            .collect();
        users.sort();
        Ok(users)
    }

    async fn claim_firing(&self, user: UserId, today: NaiveDate) -> BotResult<bool> {
        let mut state = self.state.lock().await;
        match state.reminders.get_mut(&user) {
            Some(setting) if setting.last_fired_on != Some(today) => {
                setting.last_fired_on = Some(today);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OverlayStore for MemoryStore {
    async fn add_todo(&self, user: UserId, todo: NewTodo) -> BotResult<Todo> {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: user,
            course_id: todo.course_id,
            text: todo.text,
            done: false,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.todos.push(todo.clone());
        Ok(todo)
    }

    async fn todos(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Todo>> {
        let state = self.state.lock().await;
        Ok(state
            .todos
            .iter()
            .filter(|t| t.user_id == user && (course_id.is_none() || t.course_id == course_id))
            .cloned()
            .collect())
    }

    async fn set_todo_done(&self, user: UserId, id: Uuid, done: bool) -> BotResult<Option<Todo>> {
        let mut state = self.state.lock().await;
        let Some(todo) = state.todos.iter_mut().find(|t| t.id == id && t.user_id == user) else {
            return Ok(None);
        };
        todo.done = done;
        todo.updated_at = Utc::now();
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, user: UserId, id: Uuid) -> BotResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.todos.len();
        state.todos.retain(|t| !(t.id == id && t.user_id == user));
        Ok(state.todos.len() != before)
    }

    async fn save_note(&self, user: UserId, note: NewNote) -> BotResult<Note> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(item_id) = note.item_id {
            if let Some(existing) = state
                .notes
                .iter_mut()
                .find(|n| n.user_id == user && n.item_id == Some(item_id))
            {
                existing.text = note.text;
                existing.course_id = note.course_id;
                existing.updated_at = now;
                return Ok(existing.clone());
            }
        }
        let note = Note {
            id: Uuid::new_v4(),
            user_id: user,
            course_id: note.course_id,
            item_id: note.item_id,
            text: note.text,
            created_at: now,
            updated_at: now,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn notes(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Note>> {
        let state = self.state.lock().await;
        Ok(state
            .notes
            .iter()
            .filter(|n| n.user_id == user && (course_id.is_none() || n.course_id == course_id))
            .cloned()
            .collect())
    }

    async fn delete_note(&self, user: UserId, id: Uuid) -> BotResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.notes.len();
        state.notes.retain(|n| !(n.id == id && n.user_id == user));
        Ok(state.notes.len() != before)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn touch_user(&self, user: UserId) -> BotResult<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains(&user) {
            state.users.push(user);
        }
        Ok(())
    }

    async fn all_users(&self) -> BotResult<Vec<UserId>> {
        Ok(self.state.lock().await.users.clone())
    }

    async fn stats(&self) -> BotResult<AdminStats> {
        let state = self.state.lock().await;
        Ok(AdminStats {
            users: state.users.len() as i64,
            linked: state.credentials.len() as i64,
            reminders_enabled: state.reminders.values().filter(|r| r.enabled).count() as i64,
            notes: state.notes.len() as i64,
            todos: state.todos.len() as i64,
            todos_done: state.todos.iter().filter(|t| t.done).count() as i64,
        })
    }

    async fn purge(&self, user: UserId) -> BotResult<()> {
        let mut state = self.state.lock().await;
        if !state.users.contains(&user) {
            return Err(BotError::NotFound(format!("User {user}")));
        }
        state.users.retain(|u| *u != user);
        state.credentials.remove(&user);
        state.reminders.remove(&user);
        state.todos.retain(|t| t.user_id != user);
        state.notes.retain(|n| n.user_id != user);
        Ok(())
    }
}
