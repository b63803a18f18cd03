//! SQLite-backed implementation of the core storage traits. Credentials and
//! todo/note text are sealed with the [`Keyring`] before they reach a row.

use async_trait::async_trait;
use chrono::NaiveDate;
use duebot_core::{
    crypto::Keyring,
    errors::{BotError, BotResult},
    models::{
        course::CourseId,
        overlay::{NewNote, NewTodo, Note, Todo},
        user::{
            AccessToken, CipherScheme, Credential, CredentialStatus, DEFAULT_REMINDER_HOUR,
            ReminderSetting, SealedSecret, UserId,
        },
        view::AdminStats,
    },
    store::{CredentialStore, OverlayStore, ReminderStore, UserStore},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    DbPool,
    models::{DbCredential, DbNote, DbReminderSetting, DbTodo},
    repositories::{credentials, notes, reminders, todos, users},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct SqlStore {
    pool: DbPool,
    keyring: Keyring,
}

impl SqlStore {
    pub fn new(pool: DbPool, keyring: Keyring) -> Self {
        Self { pool, keyring }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    fn open_credential(&self, row: DbCredential) -> BotResult<Credential> {
        let scheme = CipherScheme::parse(&row.scheme)
            .ok_or_else(|| BotError::Crypto(format!("unknown cipher scheme {}", row.scheme)))?;
        let status = if row.status == "invalid" {
            CredentialStatus::Invalid
        } else {
            CredentialStatus::Valid
        };
        let token = self.keyring.open_credential(&SealedSecret {
            scheme,
            ciphertext: row.ciphertext,
        })?;

        Ok(Credential {
            user_id: UserId::from_i64(row.user_id),
            token,
            scheme,
            status,
            updated_at: row.updated_at,
        })
    }

    fn open_todo(&self, row: DbTodo) -> BotResult<Todo> {
        Ok(Todo {
            id: row.id,
            user_id: UserId::from_i64(row.user_id),
            course_id: row.course_id,
            text: self.keyring.open_text(&row.text_enc)?,
            done: row.done,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn open_note(&self, row: DbNote) -> BotResult<Note> {
        Ok(Note {
            id: row.id,
            user_id: UserId::from_i64(row.user_id),
            course_id: row.course_id,
            item_id: row.item_id,
            text: self.keyring.open_text(&row.text_enc)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Re-encrypt every credential sealed with `from` under `to`, one row at
    /// a time. Rows that fail are counted and left untouched.
    pub async fn migrate_credentials(
        &self,
        from: CipherScheme,
        to: CipherScheme,
    ) -> BotResult<MigrationReport> {
        let rows = credentials::list_by_scheme(&self.pool, from.as_str()).await?;
        let mut report = MigrationReport::default();

        for row in rows {
            let sealed = SealedSecret {
                scheme: from,
                ciphertext: row.ciphertext.clone(),
            };
            let resealed = match self.keyring.reseal(&sealed, to) {
                Ok(resealed) => resealed,
                Err(err) => {
                    warn!(user_id = row.user_id, error = %err, "Could not re-encrypt credential");
                    report.failed += 1;
                    continue;
                }
            };

            let replaced = credentials::replace_ciphertext(
                &self.pool,
                row.user_id,
                &row.ciphertext,
                resealed.scheme.as_str(),
                &resealed.ciphertext,
            )
            .await?;
            if replaced {
                report.migrated += 1;
            } else {
                warn!(user_id = row.user_id, "Credential changed during migration, skipped");
                report.failed += 1;
            }
        }

        info!(migrated = report.migrated, failed = report.failed, "Credential migration finished");
        Ok(report)
    }
}

fn reminder_from_row(row: DbReminderSetting) -> ReminderSetting {
    ReminderSetting {
        user_id: UserId::from_i64(row.user_id),
        hour: row.hour.clamp(0, 23) as u8,
        enabled: row.enabled,
        last_fired_on: row.last_fired_on,
    }
}

#[async_trait]
impl CredentialStore for SqlStore {
    async fn get(&self, user: UserId) -> BotResult<Option<Credential>> {
        credentials::get_credential(&self.pool, user.as_i64())
            .await?
            .map(|row| self.open_credential(row))
            .transpose()
    }

    async fn put(&self, user: UserId, token: &AccessToken) -> BotResult<()> {
        let sealed = self.keyring.seal_credential(token)?;
        users::ensure_user(&self.pool, user.as_i64()).await?;
        credentials::upsert_credential(
            &self.pool,
            user.as_i64(),
            sealed.scheme.as_str(),
            &sealed.ciphertext,
        )
        .await?;
        Ok(())
    }

    async fn mark_invalid(&self, user: UserId) -> BotResult<()> {
        credentials::mark_invalid(&self.pool, user.as_i64()).await?;
        Ok(())
    }

    async fn revoke(&self, user: UserId) -> BotResult<bool> {
        Ok(credentials::delete_credential(&self.pool, user.as_i64()).await?)
    }
}

#[async_trait]
impl ReminderStore for SqlStore {
    async fn reminder(&self, user: UserId) -> BotResult<Option<ReminderSetting>> {
        Ok(reminders::get_reminder(&self.pool, user.as_i64())
            .await?
            .map(reminder_from_row))
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
        users::ensure_user(&self.pool, user.as_i64()).await?;
        let row = reminders::upsert_reminder(&self.pool, user.as_i64(), i64::from(hour), enabled)
            .await?;
        Ok(reminder_from_row(row))
    }

    async fn ensure_default_reminder(&self, user: UserId) -> BotResult<()> {
        users::ensure_user(&self.pool, user.as_i64()).await?;
        reminders::insert_default_reminder(
            &self.pool,
            user.as_i64(),
            i64::from(DEFAULT_REMINDER_HOUR),
        )
        .await?;
        Ok(())
    }

    async fn due_reminders(&self, hour: u8, today: NaiveDate) -> BotResult<Vec<UserId>> {
        let ids = reminders::list_due_user_ids(&self.pool, i64::from(hour), today).await?;
        Ok(ids.into_iter().map(UserId::from_i64).collect())
    }

    async fn claim_firing(&self, user: UserId, today: NaiveDate) -> BotResult<bool> {
        Ok(reminders::claim_firing(&self.pool, user.as_i64(), today).await?)
    }
}

#[async_trait]
impl OverlayStore for SqlStore {
    async fn add_todo(&self, user: UserId, todo: NewTodo) -> BotResult<Todo> {
        let text_enc = self.keyring.seal_text(&todo.text)?;
        users::ensure_user(&self.pool, user.as_i64()).await?;
        let row = todos::create_todo(&self.pool, user.as_i64(), todo.course_id, &text_enc).await?;
        self.open_todo(row)
    }

    async fn todos(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Todo>> {
        todos::list_todos(&self.pool, user.as_i64(), course_id)
            .await?
            .into_iter()
            .map(|row| self.open_todo(row))
            .collect()
    }

    async fn set_todo_done(&self, user: UserId, id: Uuid, done: bool) -> BotResult<Option<Todo>> {
        todos::set_done(&self.pool, user.as_i64(), id, done)
            .await?
            .map(|row| self.open_todo(row))
            .transpose()
    }

    async fn delete_todo(&self, user: UserId, id: Uuid) -> BotResult<bool> {
        Ok(todos::delete_todo(&self.pool, user.as_i64(), id).await?)
    }

    async fn save_note(&self, user: UserId, note: NewNote) -> BotResult<Note> {
        let text_enc = self.keyring.seal_text(&note.text)?;
        users::ensure_user(&self.pool, user.as_i64()).await?;
        let row = match note.item_id {
            Some(item_id) => {
                notes::upsert_item_note(&self.pool, user.as_i64(), note.course_id, item_id, &text_enc)
                    .await?
            }
            None => notes::create_note(&self.pool, user.as_i64(), note.course_id, &text_enc).await?,
        };
        self.open_note(row)
    }

    async fn notes(&self, user: UserId, course_id: Option<CourseId>) -> BotResult<Vec<Note>> {
        notes::list_notes(&self.pool, user.as_i64(), course_id)
            .await?
            .into_iter()
            .map(|row| self.open_note(row))
            .collect()
    }

    async fn delete_note(&self, user: UserId, id: Uuid) -> BotResult<bool> {
        Ok(notes::delete_note(&self.pool, user.as_i64(), id).await?)
    }
}

#[async_trait]
impl UserStore for SqlStore {
    async fn touch_user(&self, user: UserId) -> BotResult<()> {
        users::ensure_user(&self.pool, user.as_i64()).await?;
        Ok(())
    }

    async fn all_users(&self) -> BotResult<Vec<UserId>> {
        let ids = users::list_user_ids(&self.pool).await?;
        Ok(ids.into_iter().map(UserId::from_i64).collect())
    }

    async fn stats(&self) -> BotResult<AdminStats> {
        let stats = users::get_stats(&self.pool).await?;
        Ok(AdminStats {
            users: stats.users,
            linked: stats.linked,
            reminders_enabled: stats.reminders_enabled,
            notes: stats.notes,
            todos: stats.todos,
            todos_done: stats.todos_done,
        })
    }

    async fn purge(&self, user: UserId) -> BotResult<()> {
        if users::purge_user(&self.pool, user.as_i64()).await? {
            Ok(())
        } else {
            Err(BotError::NotFound(format!("User {user}")))
        }
    }
}
