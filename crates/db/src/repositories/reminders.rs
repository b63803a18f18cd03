use chrono::NaiveDate;
use eyre::Result;
use sqlx::{Pool, Sqlite};

use crate::models::DbReminderSetting;

pub async fn get_reminder(pool: &Pool<Sqlite>, user_id: i64) -> Result<Option<DbReminderSetting>> {
    let setting = sqlx::query_as::<_, DbReminderSetting>(
        r#"
        SELECT user_id, hour, enabled, last_fired_on
        FROM reminder_settings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// Upsert hour and enabled flag, keeping `last_fired_on`.
pub async fn upsert_reminder(
    pool: &Pool<Sqlite>,
    user_id: i64,
    hour: i64,
    enabled: bool,
) -> Result<DbReminderSetting> {
    let setting = sqlx::query_as::<_, DbReminderSetting>(
        r#"
        INSERT INTO reminder_settings (user_id, hour, enabled, last_fired_on)
        VALUES ($1, $2, $3, NULL)
        ON CONFLICT (user_id) DO UPDATE SET
            hour = excluded.hour,
            enabled = excluded.enabled
        RETURNING user_id, hour, enabled, last_fired_on
        "#,
    )
    .bind(user_id)
    .bind(hour)
    .bind(enabled)
    .fetch_one(pool)
    .await?;

    Ok(setting)
}

pub async fn insert_default_reminder(pool: &Pool<Sqlite>, user_id: i64, hour: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO reminder_settings (user_id, hour, enabled, last_fired_on)
        VALUES ($1, $2, 1, NULL)
        "#,
    )
    .bind(user_id)
    .bind(hour)
    .execute(pool)
    .await?;

    Ok(())
}

/// Users due at `hour` who have not fired on `today` and whose credential is
/// still valid.
pub async fn list_due_user_ids(pool: &Pool<Sqlite>, hour: i64, today: NaiveDate) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT r.user_id
        FROM reminder_settings r
        JOIN credentials c ON c.user_id = r.user_id
        WHERE r.enabled = 1
          AND r.hour = $1
          AND (r.last_fired_on IS NULL OR r.last_fired_on <> $2)
          AND c.status = 'valid'
        ORDER BY r.user_id
        "#,
    )
    .bind(hour)
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Set `last_fired_on = today` unless already set. Returns whether this call
/// made the change.
pub async fn claim_firing(pool: &Pool<Sqlite>, user_id: i64, today: NaiveDate) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reminder_settings
        SET last_fired_on = $2
        WHERE user_id = $1 AND (last_fired_on IS NULL OR last_fired_on <> $2)
        "#,
    )
    .bind(user_id)
    .bind(today)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
