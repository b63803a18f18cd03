use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbCredential {
    pub user_id: i64,
    pub scheme: String,
    pub ciphertext: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReminderSetting {
    pub user_id: i64,
    pub hour: i64,
    pub enabled: bool,
    pub last_fired_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbTodo {
    pub id: Uuid,
    pub user_id: i64,
    pub course_id: Option<i64>,
    pub text_enc: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbNote {
    pub id: Uuid,
    pub user_id: i64,
    pub course_id: Option<i64>,
    pub item_id: Option<i64>,
    pub text_enc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
pub struct DbStats {
    pub users: i64,
    pub linked: i64,
    pub reminders_enabled: i64,
    pub notes: i64,
    pub todos: i64,
    pub todos_done: i64,
}
