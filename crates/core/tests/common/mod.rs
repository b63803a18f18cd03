#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use duebot_core::{
    aggregator::Aggregator,
    course_cache::CourseCache,
    lms::MockLmsApi,
    models::{
        course::Course,
        item::{RawAssignment, RawQuiz, RawSubmission},
        user::{AccessToken, UserId},
    },
    store::{CredentialStore, MemoryStore},
    time::ManualClock,
};

pub const NOW: &str = "2026-10-18T01:00:00Z";

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn now() -> DateTime<Utc> {
    utc(NOW)
}

pub fn course(id: i64, name: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
    }
}

pub fn assignment(
    id: i64,
    name: &str,
    due_at: Option<DateTime<Utc>>,
    state: &str,
    attempt: Option<u32>,
) -> RawAssignment {
    RawAssignment {
        id,
        name: name.to_string(),
        due_at,
        html_url: format!("https://canvas.example.edu/assignments/{id}"),
        points_possible: Some(10.0),
        submission_types: vec!["online_upload".to_string()],
        submission: Some(RawSubmission {
            workflow_state: state.to_string(),
            attempt,
            score: None,
        }),
    }
}

pub fn pending_assignment(id: i64, name: &str, due_in: Duration) -> RawAssignment {
    assignment(id, name, Some(now() + due_in), "unsubmitted", None)
}

pub fn quiz(id: i64, title: &str, due_at: Option<DateTime<Utc>>) -> RawQuiz {
    RawQuiz {
        id,
        title: title.to_string(),
        due_at,
        html_url: format!("https://canvas.example.edu/quizzes/{id}"),
        points_possible: Some(5.0),
        time_limit: None,
    }
}

pub fn token() -> AccessToken {
    AccessToken::new("1770~abcdefghijklmnop")
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
    pub cache: Arc<CourseCache>,
    pub aggregator: Arc<Aggregator>,
}

/// Aggregator over `lms` with an in-memory store and a clock parked at `NOW`.
pub fn harness(lms: MockLmsApi) -> Harness {
    let lms = Arc::new(lms);
    let store = Arc::new(MemoryStore::new());
    let clock = ManualClock::new(now());
    let cache = Arc::new(CourseCache::new(lms.clone()));
    let aggregator = Arc::new(Aggregator::new(
        lms,
        store.clone(),
        cache.clone(),
        Arc::new(clock.clone()),
    ));

    Harness {
        store,
        clock,
        cache,
        aggregator,
    }
}

pub async fn link(store: &MemoryStore, user: UserId) {
    store.put(user, &token()).await.unwrap();
}
