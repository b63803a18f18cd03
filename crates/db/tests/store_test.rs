use std::sync::Arc;

use chrono::NaiveDate;
use duebot_core::{
    crypto::{FernetCipher, Keyring, LocalKeyWrapper, random_key},
    errors::BotError,
    models::{
        overlay::{NewNote, NewTodo},
        user::{AccessToken, CipherScheme, CredentialStatus, UserId},
    },
    store::{CredentialStore, OverlayStore, ReminderStore, UserStore},
};
use duebot_db::{DbPool, SqlStore, create_memory_pool, repositories::credentials};
use pretty_assertions::assert_eq;

const USER: UserId = UserId(1_234_567_890_123_456_789);

fn keyring() -> Keyring {
    Keyring::new(&FernetCipher::generate_key()).unwrap()
}

async fn store_with(keyring: Keyring) -> (SqlStore, DbPool) {
    let pool = create_memory_pool().await.expect("Failed to create test pool");
    (SqlStore::new(pool.clone(), keyring), pool)
}

async fn store() -> SqlStore {
    store_with(keyring()).await.0
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

#[tokio::test]
async fn test_credential_is_encrypted_at_rest() {
    let (store, pool) = store_with(keyring()).await;
    let token = AccessToken::new("1770~plaintext-secret");

    store.put(USER, &token).await.unwrap();

    let row = credentials::get_credential(&pool, USER.as_i64()).await.unwrap().unwrap();
    assert!(!row.ciphertext.contains("plaintext-secret"));
    assert_eq!(row.scheme, "fernet");

    let credential = store.get(USER).await.unwrap().unwrap();
    assert_eq!(credential.token, token);
    assert_eq!(credential.user_id, USER);
    assert_eq!(credential.status, CredentialStatus::Valid);
}

#[tokio::test]
async fn test_replace_clears_invalid_flag() {
    let store = store().await;
    store.put(USER, &AccessToken::new("1770~old-token-value")).await.unwrap();
    store.mark_invalid(USER).await.unwrap();
    assert_eq!(store.get(USER).await.unwrap().unwrap().status, CredentialStatus::Invalid);

    store.put(USER, &AccessToken::new("1770~new-token-value")).await.unwrap();

    let credential = store.get(USER).await.unwrap().unwrap();
    assert_eq!(credential.status, CredentialStatus::Valid);
    assert_eq!(credential.token.expose(), "1770~new-token-value");
}

#[tokio::test]
async fn test_envelope_and_fernet_rows_coexist() {
    let fernet_key = FernetCipher::generate_key();
    let legacy = Keyring::new(&fernet_key).unwrap();
    let wrapper = Arc::new(LocalKeyWrapper::new(random_key()));
    let current = Keyring::new(&fernet_key).unwrap().with_envelope(wrapper);

    let pool = create_memory_pool().await.unwrap();
    let old_store = SqlStore::new(pool.clone(), legacy);
    let new_store = SqlStore::new(pool.clone(), current);

    old_store.put(UserId(1), &AccessToken::new("1770~legacy-token")).await.unwrap();
    new_store.put(UserId(2), &AccessToken::new("1770~fresh-token")).await.unwrap();

    let first = new_store.get(UserId(1)).await.unwrap().unwrap();
    let second = new_store.get(UserId(2)).await.unwrap().unwrap();
    assert_eq!(first.scheme, CipherScheme::Fernet);
    assert_eq!(second.scheme, CipherScheme::Envelope);
    assert_eq!(first.token.expose(), "1770~legacy-token");
    assert_eq!(second.token.expose(), "1770~fresh-token");
}

#[tokio::test]
async fn test_migrate_credentials_to_envelope() {
    let fernet_key = FernetCipher::generate_key();
    let pool = create_memory_pool().await.unwrap();
    let legacy = SqlStore::new(pool.clone(), Keyring::new(&fernet_key).unwrap());
    for id in 1..=3 {
        legacy.put(UserId(id), &AccessToken::new(format!("1770~token-{id}"))).await.unwrap();
    }
    legacy.mark_invalid(UserId(3)).await.unwrap();

    let keyring = Keyring::new(&fernet_key)
        .unwrap()
        .with_envelope(Arc::new(LocalKeyWrapper::new(random_key())));
    let store = SqlStore::new(pool.clone(), keyring);

    let report = store
        .migrate_credentials(CipherScheme::Fernet, CipherScheme::Envelope)
        .await
        .unwrap();
    assert_eq!(report.migrated, 3);
    assert_eq!(report.failed, 0);

    for id in 1..=3 {
        let credential = store.get(UserId(id)).await.unwrap().unwrap();
        assert_eq!(credential.scheme, CipherScheme::Envelope);
        assert_eq!(credential.token.expose(), format!("1770~token-{id}"));
    }
    // Migration leaves validity alone.
    assert!(!store.get(UserId(3)).await.unwrap().unwrap().is_valid());

    let again = store
        .migrate_credentials(CipherScheme::Fernet, CipherScheme::Envelope)
        .await
        .unwrap();
    assert_eq!(again.migrated, 0);
}

#[tokio::test]
async fn test_reminder_claim_is_once_per_day() {
    let store = store().await;
    store.put(USER, &AccessToken::new("1770~abcdefghijkl")).await.unwrap();
    store.ensure_default_reminder(USER).await.unwrap();

    assert_eq!(store.due_reminders(9, day(18)).await.unwrap(), vec![USER]);
    assert!(store.claim_firing(USER, day(18)).await.unwrap());
    assert!(!store.claim_firing(USER, day(18)).await.unwrap());
    assert!(store.due_reminders(9, day(18)).await.unwrap().is_empty());

    // Moving the hour does not reopen today.
    store.set_reminder(USER, 10, true).await.unwrap();
    assert!(store.due_reminders(10, day(18)).await.unwrap().is_empty());
    assert_eq!(store.due_reminders(10, day(19)).await.unwrap(), vec![USER]);
}

#[tokio::test]
async fn test_due_reminders_skip_invalid_and_disabled() {
    let store = store().await;
    for id in 1..=3 {
        store.put(UserId(id), &AccessToken::new("1770~abcdefghijkl")).await.unwrap();
        store.set_reminder(UserId(id), 8, true).await.unwrap();
    }
    store.mark_invalid(UserId(2)).await.unwrap();
    store.set_reminder(UserId(3), 8, false).await.unwrap();
    // Reminder without any credential.
    store.set_reminder(UserId(4), 8, true).await.unwrap();

    assert_eq!(store.due_reminders(8, day(18)).await.unwrap(), vec![UserId(1)]);
}

#[tokio::test]
async fn test_default_reminder_does_not_overwrite() {
    let store = store().await;
    store.set_reminder(USER, 21, false).await.unwrap();
    store.ensure_default_reminder(USER).await.unwrap();

    let setting = store.reminder(USER).await.unwrap().unwrap();
    assert_eq!(setting.hour, 21);
    assert!(!setting.enabled);

    let err = store.set_reminder(USER, 24, true).await.unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));
}

#[tokio::test]
async fn test_todos_round_trip_encrypted() {
    let (store, pool) = store_with(keyring()).await;
    let todo = store
        .add_todo(USER, NewTodo { course_id: Some(5), text: "Email the TA".to_string() })
        .await
        .unwrap();
    store
        .add_todo(USER, NewTodo { course_id: None, text: "Print notes".to_string() })
        .await
        .unwrap();

    let raw: String = sqlx::query_scalar("SELECT text_enc FROM todos WHERE course_id = 5")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!raw.contains("Email"));

    assert_eq!(store.todos(USER, Some(5)).await.unwrap().len(), 1);
    assert_eq!(store.todos(USER, None).await.unwrap().len(), 2);

    let done = store.set_todo_done(USER, todo.id, true).await.unwrap().unwrap();
    assert!(done.done);
    assert_eq!(done.text, "Email the TA");
    assert!(store.set_todo_done(UserId(9), todo.id, true).await.unwrap().is_none());

    assert!(store.delete_todo(USER, todo.id).await.unwrap());
    assert!(!store.delete_todo(USER, todo.id).await.unwrap());
}

#[tokio::test]
async fn test_item_note_upsert() {
    let store = store().await;
    let first = store
        .save_note(USER, NewNote { course_id: Some(5), item_id: Some(77), text: "draft".to_string() })
        .await
        .unwrap();
    let second = store
        .save_note(USER, NewNote { course_id: Some(5), item_id: Some(77), text: "final".to_string() })
        .await
        .unwrap();
    store
        .save_note(USER, NewNote { course_id: Some(5), item_id: None, text: "general".to_string() })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let notes = store.notes(USER, Some(5)).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().any(|n| n.text == "final"));
    assert!(!notes.iter().any(|n| n.text == "draft"));
}

#[tokio::test]
async fn test_revoke_keeps_user_records() {
    let store = store().await;
    store.put(USER, &AccessToken::new("1770~abcdefghijkl")).await.unwrap();
    store.ensure_default_reminder(USER).await.unwrap();
    store
        .add_todo(USER, NewTodo { course_id: None, text: "keep".to_string() })
        .await
        .unwrap();

    assert!(store.revoke(USER).await.unwrap());
    assert!(store.get(USER).await.unwrap().is_none());
    assert!(store.reminder(USER).await.unwrap().is_some());
    assert_eq!(store.todos(USER, None).await.unwrap().len(), 1);
    assert_eq!(store.all_users().await.unwrap(), vec![USER]);
}

#[tokio::test]
async fn test_stats_and_purge() {
    let store = store().await;
    store.put(UserId(1), &AccessToken::new("1770~abcdefghijkl")).await.unwrap();
    store.ensure_default_reminder(UserId(1)).await.unwrap();
    store.touch_user(UserId(2)).await.unwrap();
    let todo = store
        .add_todo(UserId(1), NewTodo { course_id: None, text: "one".to_string() })
        .await
        .unwrap();
    store.set_todo_done(UserId(1), todo.id, true).await.unwrap();
    store
        .save_note(UserId(2), NewNote { course_id: None, item_id: None, text: "n".to_string() })
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.linked, 1);
    assert_eq!(stats.reminders_enabled, 1);
    assert_eq!(stats.notes, 1);
    assert_eq!(stats.todos, 1);
    assert_eq!(stats.todos_done, 1);

    store.purge(UserId(1)).await.unwrap();
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.users, 1);
    assert_eq!(stats.linked, 0);
    assert_eq!(stats.todos, 0);

    assert!(matches!(store.purge(UserId(1)).await.unwrap_err(), BotError::NotFound(_)));
}
