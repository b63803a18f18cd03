use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::models::DbTodo;

pub async fn create_todo(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: Option<i64>,
    text_enc: &str,
) -> Result<DbTodo> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let todo = sqlx::query_as::<_, DbTodo>(
        r#"
        INSERT INTO todos (id, user_id, course_id, text_enc, done, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 0, $5, $5)
        RETURNING id, user_id, course_id, text_enc, done, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(course_id)
    .bind(text_enc)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Todo created: id={}, user_id={}", id, user_id);
    Ok(todo)
}

pub async fn list_todos(
    pool: &Pool<Sqlite>,
    user_id: i64,
    course_id: Option<i64>,
) -> Result<Vec<DbTodo>> {
    let todos = sqlx::query_as::<_, DbTodo>(
        r#"
        SELECT id, user_id, course_id, text_enc, done, created_at, updated_at
        FROM todos
        WHERE user_id = $1 AND ($2 IS NULL OR course_id = $2)
        ORDER BY done ASC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(todos)
}

pub async fn set_done(
    pool: &Pool<Sqlite>,
    user_id: i64,
    id: Uuid,
    done: bool,
) -> Result<Option<DbTodo>> {
    let todo = sqlx::query_as::<_, DbTodo>(
        r#"
        UPDATE todos
        SET done = $3, updated_at = $4
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, course_id, text_enc, done, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(done)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(todo)
}

pub async fn delete_todo(pool: &Pool<Sqlite>, user_id: i64, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
