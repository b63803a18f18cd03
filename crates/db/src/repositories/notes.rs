use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::DbNote;

pub async fn create_note(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: Option<i64>,
    text_enc: &str,
) -> Result<DbNote> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let note = sqlx::query_as::<_, DbNote>(
        r#"
        INSERT INTO notes (id, user_id, course_id, item_id, text_enc, created_at, updated_at)
        VALUES ($1, $2, $3, NULL, $4, $5, $5)
        RETURNING id, user_id, course_id, item_id, text_enc, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(course_id)
    .bind(text_enc)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(note)
}

/// Insert or replace the user's note for one item.
pub async fn upsert_item_note(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: Option<i64>,
    item_id: i64,
    text_enc: &str,
) -> Result<DbNote> {
    let now = Utc::now();

    let note = sqlx::query_as::<_, DbNote>(
        r#"
        INSERT INTO notes (id, user_id, course_id, item_id, text_enc, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        ON CONFLICT (user_id, item_id) WHERE item_id IS NOT NULL DO UPDATE SET
            course_id = excluded.course_id,
            text_enc = excluded.text_enc,
            updated_at = excluded.updated_at
        RETURNING id, user_id, course_id, item_id, text_enc, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(course_id)
    .bind(item_id)
    .bind(text_enc)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(note)
}

pub async fn list_notes(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<DbNote>> {
    let notes = sqlx::query_as::<_, DbNote>(
        r#"
        SELECT id, user_id, course_id, item_id, text_enc, created_at, updated_at
        FROM notes
        WHERE user_id = $1 AND ($2 IS NULL OR course_id = $2)
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(notes)
}

pub async fn delete_note(pool: &Pool<Sqlite>, user_id: i64, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
