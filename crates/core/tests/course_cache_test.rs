mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use common::*;
use duebot_core::{course_cache::CourseCache, lms::MockLmsApi, models::user::UserId};
use pretty_assertions::assert_eq;

fn counting_lms(calls: Arc<AtomicUsize>) -> MockLmsApi {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses().returning(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![course(2, "MA1521 Calculus"), course(1, "CS2030S Programming")])
    });
    lms
}

#[tokio::test]
async fn test_get_is_cached_until_invalidated() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = CourseCache::new(Arc::new(counting_lms(calls.clone())));
    let user = UserId(10);

    let first = cache.get(user, &token()).await.unwrap();
    let second = cache.get(user, &token()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(first.courses()[0].name, "CS2030S Programming");

    cache.invalidate(user).await;
    assert!(!cache.is_cached(user).await);

    cache.get(user, &token()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    cache.get(user, &token()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_entries_are_per_user() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = CourseCache::new(Arc::new(counting_lms(calls.clone())));

    cache.get(UserId(1), &token()).await.unwrap();
    cache.get(UserId(2), &token()).await.unwrap();
    cache.invalidate(UserId(1)).await;

    assert!(!cache.is_cached(UserId(1)).await);
    assert!(cache.is_cached(UserId(2)).await);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let mut lms = MockLmsApi::new();
    lms.expect_list_active_courses()
        .times(1)
        .returning(|_| Err(duebot_core::lms::LmsError::Unavailable("HTTP 500".to_string())));
    let cache = CourseCache::new(Arc::new(lms));

    assert!(cache.get(UserId(3), &token()).await.is_err());
    assert!(!cache.is_cached(UserId(3)).await);
}
