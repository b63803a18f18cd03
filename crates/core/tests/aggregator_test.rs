mod common;

use chrono::Duration;
use common::*;
use duebot_core::{
    errors::BotError,
    lms::{LmsError, MockLmsApi},
    models::{
        course::{RawFile, RawFolder},
        item::{ItemKind, RawQuizSubmission, SubmissionState},
        user::{CredentialStatus, UserId},
    },
    store::CredentialStore,
};
use pretty_assertions::assert_eq;

const USER: UserId = UserId(4242);

fn single_course(lms: &mut MockLmsApi) {
    lms.expect_list_active_courses()
        .returning(|_| Ok(vec![course(101, "CS2030S Programming")]));
}

#[tokio::test]
async fn test_upcoming_returns_only_in_window_assignment() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments()
        .returning(|_, _| Ok(vec![pending_assignment(1, "Lab 4", Duration::days(2))]));
    lms.expect_list_quizzes()
        .returning(|_, _| Ok(vec![quiz(2, "Quiz 3", Some(now() + Duration::days(10)))]));
    // The quiz is outside the window, so its submission is never looked up.
    lms.expect_quiz_submission().times(0);

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, Some(7)).await.unwrap();

    assert!(view.submitted.is_empty());
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.pending[0].title, "Lab 4");
    assert_eq!(view.pending[0].kind, ItemKind::Assignment);
    assert_eq!(view.pending[0].kind.marker(), "[A]");
    assert_eq!(view.pending[0].submission, SubmissionState::NotSubmitted);
    assert_eq!(view.window_days, 7);
}

#[tokio::test]
async fn test_upcoming_window_boundaries() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| {
        Ok(vec![
            assignment(1, "due now", Some(now()), "unsubmitted", None),
            assignment(2, "just inside", Some(now() + Duration::days(7) - Duration::seconds(1)), "unsubmitted", None),
            assignment(3, "at end", Some(now() + Duration::days(7)), "unsubmitted", None),
            assignment(4, "already past", Some(now() - Duration::seconds(1)), "unsubmitted", None),
            assignment(5, "no deadline", None, "unsubmitted", None),
        ])
    });
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, None).await.unwrap();
    let titles: Vec<&str> = view.pending.iter().map(|i| i.title.as_str()).collect();

    assert_eq!(titles, vec!["due now", "just inside"]);
}

#[tokio::test]
async fn test_upcoming_partitions_and_orders_deterministically() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses().returning(|_| {
        Ok(vec![course(300, "MA1521 Calculus"), course(200, "CS2040S Data Structures")])
    });
    lms.expect_list_assignments().returning(|_, course_id| {
        let due = now() + Duration::days(1);
        Ok(match course_id {
            300 => vec![
                assignment(31, "Tutorial B", Some(due), "unsubmitted", None),
                assignment(32, "Tutorial A", Some(due), "unsubmitted", None),
                assignment(33, "Problem Set", Some(due), "graded", Some(1)),
            ],
            _ => vec![
                assignment(21, "PS 2", Some(due), "unsubmitted", None),
                assignment(22, "PS 1", Some(now() + Duration::hours(3)), "graded", Some(0)),
            ],
        })
    });
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let first = h.aggregator.upcoming(USER, Some(3)).await.unwrap();
    let second = h.aggregator.upcoming(USER, Some(3)).await.unwrap();

    let ids: Vec<i64> = first.pending.iter().map(|i| i.id).collect();
    // Graded with zero attempts is still pending.
    assert_eq!(ids, vec![22, 21, 32, 31]);
    assert_eq!(first.submitted.iter().map(|i| i.id).collect::<Vec<_>>(), vec![33]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_upcoming_rejects_zero_days_without_remote_calls() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses().times(0);

    let h = harness(lms);
    link(&h.store, USER).await;

    let err = h.aggregator.upcoming(USER, Some(0)).await.unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));
}

#[tokio::test]
async fn test_upcoming_accepts_long_windows() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments()
        .returning(|_, _| Ok(vec![pending_assignment(1, "Final report", Duration::days(120))]));
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, Some(365)).await.unwrap();
    assert_eq!(view.pending.len(), 1);
}

#[tokio::test]
async fn test_not_linked_fails_without_remote_calls() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses().times(0);

    let h = harness(lms);

    let err = h.aggregator.upcoming(USER, None).await.unwrap_err();
    assert!(matches!(err, BotError::NotLinked));
    let err = h.aggregator.due_for_reminder(USER).await.unwrap_err();
    assert!(matches!(err, BotError::NotLinked));
}

#[tokio::test]
async fn test_auth_expired_marks_invalid_then_fails_fast() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses()
        .times(1)
        .returning(|_| Ok(vec![course(101, "CS2030S Programming")]));
    lms.expect_list_assignments()
        .times(1)
        .returning(|_, _| Err(LmsError::AuthExpired));
    lms.expect_list_quizzes().times(1).returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let err = h.aggregator.upcoming(USER, None).await.unwrap_err();
    assert!(matches!(err, BotError::AuthExpired));

    let credential = h.store.get(USER).await.unwrap().unwrap();
    assert_eq!(credential.status, CredentialStatus::Invalid);

    // No further remote calls: the mock would panic past `times(1)`.
    let err = h.aggregator.upcoming(USER, None).await.unwrap_err();
    assert!(matches!(err, BotError::AuthExpired));
    let err = h.aggregator.due_for_reminder(USER).await.unwrap_err();
    assert!(matches!(err, BotError::AuthExpired));
}

#[tokio::test]
async fn test_auth_expired_on_course_listing_marks_invalid() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses()
        .times(1)
        .returning(|_| Err(LmsError::AuthExpired));

    let h = harness(lms);
    link(&h.store, USER).await;

    let err = h.aggregator.courses(USER).await.unwrap_err();
    assert!(matches!(err, BotError::AuthExpired));
    assert!(!h.store.get(USER).await.unwrap().unwrap().is_valid());
}

#[tokio::test]
async fn test_remote_unavailable_keeps_credential_valid() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments()
        .returning(|_, _| Err(LmsError::Unavailable("HTTP 502".to_string())));
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let err = h.aggregator.upcoming(USER, None).await.unwrap_err();
    assert!(matches!(err, BotError::RemoteUnavailable(_)));
    assert!(h.store.get(USER).await.unwrap().unwrap().is_valid());
}

#[tokio::test]
async fn test_disabled_quizzes_are_tolerated() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments()
        .returning(|_, _| Ok(vec![pending_assignment(1, "Essay", Duration::days(1))]));
    lms.expect_list_quizzes()
        .returning(|_, _| Err(LmsError::Unsupported("HTTP 404".to_string())));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, None).await.unwrap();
    assert_eq!(view.pending.len(), 1);
}

#[tokio::test]
async fn test_quiz_submission_resolution() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| Ok(vec![]));
    lms.expect_list_quizzes().returning(|_, _| {
        Ok(vec![
            quiz(7, "Quiz done", Some(now() + Duration::days(1))),
            quiz(8, "Quiz placeholder", Some(now() + Duration::days(1))),
            quiz(9, "Quiz lookup fails", Some(now() + Duration::days(2))),
        ])
    });
    lms.expect_quiz_submission()
        .times(3)
        .returning(|_, _, quiz_id| match quiz_id {
            7 => Ok(Some(RawQuizSubmission {
                workflow_state: "complete".to_string(),
                attempt: Some(1),
                score: Some(5.0),
            })),
            8 => Ok(Some(RawQuizSubmission {
                workflow_state: "untaken".to_string(),
                attempt: Some(0),
                score: None,
            })),
            _ => Err(LmsError::Unavailable("timeout".to_string())),
        });

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, None).await.unwrap();

    assert_eq!(view.submitted.iter().map(|i| i.id).collect::<Vec<_>>(), vec![7]);
    assert_eq!(view.pending.iter().map(|i| i.id).collect::<Vec<_>>(), vec![8, 9]);
    assert!(view.pending.iter().all(|i| i.kind == ItemKind::Quiz));
    assert_eq!(view.submitted[0].status_text, "Complete");
}

#[tokio::test]
async fn test_due_for_reminder_is_pending_only_within_48_hours() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| {
        Ok(vec![
            pending_assignment(1, "Soon", Duration::hours(47)),
            pending_assignment(2, "Later", Duration::hours(49)),
            assignment(3, "Done", Some(now() + Duration::hours(5)), "submitted", Some(1)),
        ])
    });
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.due_for_reminder(USER).await.unwrap();

    assert_eq!(view.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(view.generated_at.offset().local_minus_utc(), 8 * 3600);
}

#[tokio::test]
async fn test_due_for_reminder_skips_items_without_submission() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| {
        let mut on_paper = pending_assignment(2, "Paper worksheet", Duration::hours(6));
        on_paper.submission_types = vec!["on_paper".to_string()];
        Ok(vec![pending_assignment(1, "Lab 3", Duration::hours(6)), on_paper])
    });
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let reminder = h.aggregator.due_for_reminder(USER).await.unwrap();
    assert_eq!(reminder.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);

    let upcoming = h.aggregator.upcoming(USER, Some(1)).await.unwrap();
    let paper = upcoming.pending.iter().find(|i| i.id == 2).unwrap();
    assert_eq!(paper.submission, SubmissionState::NotApplicable);
}

fn assert_send<T: Send>(_: T) {}

#[test]
fn test_aggregator_futures_are_send() {
    let h = harness(MockLmsApi::new());
    let aggregator = h.aggregator.clone();

    assert_send(async move { aggregator.upcoming(USER, None).await });
    let aggregator = h.aggregator.clone();
    assert_send(async move { aggregator.due_for_reminder(USER).await });
    let aggregator = h.aggregator.clone();
    assert_send(async move { aggregator.course_items(USER, 101).await });
}

#[tokio::test]
async fn test_due_dates_are_converted_to_local_zone() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| {
        Ok(vec![assignment(1, "Lab", Some(utc("2026-10-19T15:59:00Z")), "unsubmitted", None)])
    });
    lms.expect_list_quizzes().returning(|_, _| Ok(vec![]));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.upcoming(USER, None).await.unwrap();
    let due = view.pending[0].due_at.unwrap();
    assert_eq!(due.to_rfc3339(), "2026-10-19T23:59:00+08:00");
}

#[tokio::test]
async fn test_course_items_lists_undated_last() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_list_assignments().returning(|_, _| {
        Ok(vec![
            assignment(1, "Reflection", None, "unsubmitted", None),
            assignment(2, "Old lab", Some(now() - Duration::days(30)), "graded", Some(1)),
            pending_assignment(3, "Next lab", Duration::days(40)),
        ])
    });
    lms.expect_list_quizzes()
        .returning(|_, _| Ok(vec![quiz(4, "Practice quiz", None)]));
    lms.expect_quiz_submission().times(1).returning(|_, _, _| Ok(None));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.course_items(USER, 101).await.unwrap();

    assert_eq!(view.course_name.as_deref(), Some("CS2030S Programming"));
    assert_eq!(view.items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3, 4, 1]);
    assert_eq!(view.items[2].status_text, "Not taken");

    let err = h.aggregator.course_items(USER, 999).await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
}

#[tokio::test]
async fn test_folder_caps_file_list() {
    let mut lms = MockLmsApi::new();
    single_course(&mut lms);
    lms.expect_root_folder().returning(|_, _| {
        Ok(RawFolder {
            id: 50,
            name: "course files".to_string(),
        })
    });
    lms.expect_subfolders().returning(|_, _| {
        Ok(vec![RawFolder {
            id: 51,
            name: "Lectures".to_string(),
        }])
    });
    lms.expect_folder_files().returning(|_, _| {
        Ok((1..=20)
            .map(|id| RawFile {
                id,
                display_name: format!("L{id}.pdf"),
                size: 1024,
            })
            .collect())
    });
    lms.expect_file_url()
        .returning(|course_id, file_id| format!("https://canvas.example.edu/courses/{course_id}/files/{file_id}"));

    let h = harness(lms);
    link(&h.store, USER).await;

    let view = h.aggregator.folder(USER, 101, None).await.unwrap();

    assert_eq!(view.folder_id, 50);
    assert_eq!(view.subfolders.len(), 1);
    assert_eq!(view.files.len(), 15);
    assert_eq!(view.total_files, 20);
    assert_eq!(view.files[0].url, "https://canvas.example.edu/courses/101/files/1");
}

#[tokio::test]
async fn test_hidden_folder_is_not_found() {
    let mut lms = MockLmsApi::new();
    lms.expect_root_folder()
        .returning(|_, _| Err(LmsError::Unsupported("HTTP 403".to_string())));

    let h = harness(lms);
    link(&h.store, USER).await;

    let err = h.aggregator.folder(USER, 101, None).await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
}
