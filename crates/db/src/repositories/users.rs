use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Sqlite};

use crate::models::DbStats;

/// Insert the user if missing. Returns true when a row was created.
pub async fn ensure_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (user_id, created_at)
        VALUES ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn list_user_ids(pool: &Pool<Sqlite>) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT user_id FROM users ORDER BY user_id")
        .fetch_all(pool)
        .await?;

    Ok(ids)
}

pub async fn get_stats(pool: &Pool<Sqlite>) -> Result<DbStats> {
    let stats = sqlx::query_as::<_, DbStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM credentials) AS linked,
            (SELECT COUNT(*) FROM reminder_settings WHERE enabled = 1) AS reminders_enabled,
            (SELECT COUNT(*) FROM notes) AS notes,
            (SELECT COUNT(*) FROM todos) AS todos,
            (SELECT COUNT(*) FROM todos WHERE done = 1) AS todos_done
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Hard delete of a user and everything they own. Returns false if the user
/// did not exist.
pub async fn purge_user(pool: &Pool<Sqlite>, user_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    for table in ["credentials", "reminder_settings", "todos", "notes"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::info!("Purged user {}", user_id);
    Ok(result.rows_affected() == 1)
}
