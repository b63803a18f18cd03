use std::sync::Arc;

use duebot_core::{
    errors::BotError,
    models::{
        course::{Course, CourseMap},
        overlay::{NewNote, NoteFilter, NoteKind},
        user::UserId,
    },
    overlay::Overlay,
    store::MemoryStore,
};
use pretty_assertions::assert_eq;
use uuid::Uuid;

const USER: UserId = UserId(77);

fn overlay() -> Overlay {
    Overlay::new(Arc::new(MemoryStore::new()))
}

fn names() -> CourseMap {
    CourseMap::new(vec![
        Course { id: 1, name: "MA1521 Calculus".to_string() },
        Course { id: 2, name: "CS2030S Programming".to_string() },
    ])
}

fn note(course_id: Option<i64>, item_id: Option<i64>, text: &str) -> NewNote {
    NewNote {
        course_id,
        item_id,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_todos_grouped_by_course_with_uncategorised_last() {
    let overlay = overlay();
    overlay.add_todo(USER, None, "Buy stationery").await.unwrap();
    overlay.add_todo(USER, Some(1), "Revise limits").await.unwrap();
    overlay.add_todo(USER, Some(2), "Read streams chapter").await.unwrap();
    overlay.add_todo(UserId(78), Some(2), "Someone else's").await.unwrap();

    let groups = overlay.todos(USER, false, Some(&names())).await.unwrap();
    let labels: Vec<Option<&str>> = groups.iter().map(|g| g.course_name.as_deref()).collect();

    assert_eq!(labels, vec![Some("CS2030S Programming"), Some("MA1521 Calculus"), None]);
    assert_eq!(groups.iter().map(|g| g.todos.len()).sum::<usize>(), 3);
}

#[tokio::test]
async fn test_toggle_and_include_done() {
    let overlay = overlay();
    let todo = overlay.add_todo(USER, None, "Submit form").await.unwrap();

    let toggled = overlay.toggle_todo(USER, todo.id).await.unwrap();
    assert!(toggled.done);

    assert!(overlay.todos(USER, false, None).await.unwrap().is_empty());
    assert_eq!(overlay.todos(USER, true, None).await.unwrap()[0].todos.len(), 1);

    let toggled = overlay.toggle_todo(USER, todo.id).await.unwrap();
    assert!(!toggled.done);

    let err = overlay.toggle_todo(UserId(78), todo.id).await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
}

#[tokio::test]
async fn test_todo_text_validation() {
    let overlay = overlay();

    let err = overlay.add_todo(USER, None, "   ").await.unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));

    let err = overlay.add_todo(USER, None, &"x".repeat(501)).await.unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));

    let todo = overlay.add_todo(USER, None, &"x".repeat(500)).await.unwrap();
    assert_eq!(todo.text.len(), 500);
}

#[tokio::test]
async fn test_delete_missing_todo_is_not_found() {
    let overlay = overlay();
    let err = overlay.delete_todo(USER, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
}

#[tokio::test]
async fn test_note_search_is_case_insensitive() {
    let overlay = overlay();
    overlay.save_note(USER, note(Some(1), None, "Midterm covers Chapter 5")).await.unwrap();
    overlay.save_note(USER, note(None, None, "Bring calculator")).await.unwrap();

    let filter = NoteFilter {
        query: Some("chapter".to_string()),
        ..NoteFilter::default()
    };
    let groups = overlay.notes(USER, &filter, Some(&names())).await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].course_name.as_deref(), Some("MA1521 Calculus"));
    assert_eq!(groups[0].notes[0].text, "Midterm covers Chapter 5");
}

#[tokio::test]
async fn test_item_note_is_upserted() {
    let overlay = overlay();
    let first = overlay.save_note(USER, note(Some(2), Some(900), "Use recursion")).await.unwrap();
    let second = overlay.save_note(USER, note(Some(2), Some(900), "Use streams")).await.unwrap();
    overlay.save_note(USER, note(Some(2), None, "General thought")).await.unwrap();

    assert_eq!(first.id, second.id);

    let item_notes = NoteFilter {
        kind: NoteKind::ItemNotes,
        ..NoteFilter::default()
    };
    let groups = overlay.notes(USER, &item_notes, None).await.unwrap();
    assert_eq!(groups[0].notes.len(), 1);
    assert_eq!(groups[0].notes[0].text, "Use streams");

    let general = NoteFilter {
        kind: NoteKind::General,
        course_id: Some(2),
        ..NoteFilter::default()
    };
    let groups = overlay.notes(USER, &general, None).await.unwrap();
    assert_eq!(groups[0].notes[0].text, "General thought");
}

#[tokio::test]
async fn test_note_length_limit() {
    let overlay = overlay();
    let err = overlay
        .save_note(USER, note(None, None, &"n".repeat(1001)))
        .await
        .unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));
}
