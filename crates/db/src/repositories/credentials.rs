use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Sqlite};

use crate::models::DbCredential;

pub async fn get_credential(pool: &Pool<Sqlite>, user_id: i64) -> Result<Option<DbCredential>> {
    let credential = sqlx::query_as::<_, DbCredential>(
        r#"
        SELECT user_id, scheme, ciphertext, status, updated_at
        FROM credentials
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(credential)
}

/// Store a credential in one statement. The previous ciphertext is only
/// replaced once the new row is written, and the invalid flag is cleared.
pub async fn upsert_credential(
    pool: &Pool<Sqlite>,
    user_id: i64,
    scheme: &str,
    ciphertext: &str,
) -> Result<DbCredential> {
    tracing::debug!("Storing credential: user_id={}, scheme={}", user_id, scheme);

    let credential = sqlx::query_as::<_, DbCredential>(
        r#"
        INSERT INTO credentials (user_id, scheme, ciphertext, status, updated_at)
        VALUES ($1, $2, $3, 'valid', $4)
        ON CONFLICT (user_id) DO UPDATE SET
            scheme = excluded.scheme,
            ciphertext = excluded.ciphertext,
            status = 'valid',
            updated_at = excluded.updated_at
        RETURNING user_id, scheme, ciphertext, status, updated_at
        "#,
    )
    .bind(user_id)
    .bind(scheme)
    .bind(ciphertext)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(credential)
}

pub async fn mark_invalid(pool: &Pool<Sqlite>, user_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE credentials
        SET status = 'invalid', updated_at = $2
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_credential(pool: &Pool<Sqlite>, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM credentials WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn list_by_scheme(pool: &Pool<Sqlite>, scheme: &str) -> Result<Vec<DbCredential>> {
    let credentials = sqlx::query_as::<_, DbCredential>(
        r#"
        SELECT user_id, scheme, ciphertext, status, updated_at
        FROM credentials
        WHERE scheme = $1
        ORDER BY user_id
        "#,
    )
    .bind(scheme)
    .fetch_all(pool)
    .await?;

    Ok(credentials)
}

/// Swap the ciphertext of one row without touching its status, only if the
/// row still holds `expected`. Returns whether the row was updated.
pub async fn replace_ciphertext(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expected: &str,
    scheme: &str,
    ciphertext: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE credentials
        SET scheme = $3, ciphertext = $4
        WHERE user_id = $1 AND ciphertext = $2
        "#,
    )
    .bind(user_id)
    .bind(expected)
    .bind(scheme)
    .bind(ciphertext)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
