use eyre::Result;
use sqlx::{Pool, Sqlite};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Sqlite>) -> Result<()> {
    info!("Initializing database schema...");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create credentials table, one row per user
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credentials (
            user_id INTEGER PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
            scheme TEXT NOT NULL CHECK (scheme IN ('fernet', 'envelope')),
            ciphertext TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'valid' CHECK (status IN ('valid', 'invalid')),
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create reminder_settings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminder_settings (
            user_id INTEGER PRIMARY KEY REFERENCES users(user_id) ON DELETE CASCADE,
            hour INTEGER NOT NULL CHECK (hour BETWEEN 0 AND 23),
            enabled INTEGER NOT NULL DEFAULT 1,
            last_fired_on TEXT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create todos table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id BLOB PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            course_id INTEGER NULL,
            text_enc TEXT NOT NULL,
            done INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create notes table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id BLOB PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
            course_id INTEGER NULL,
            item_id INTEGER NULL,
            text_enc TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_reminder_settings_hour ON reminder_settings(hour, enabled);
        CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos(user_id);
        CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes(user_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_user_item ON notes(user_id, item_id)
            WHERE item_id IS NOT NULL;
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
