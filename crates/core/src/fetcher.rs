//! Remote Item Fetcher: pulls assignments and quizzes for a set of courses and
//! normalizes them into [`Item`]s. Stateless; credential bookkeeping belongs
//! to the caller.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, warn};

use crate::{
    errors::{BotError, BotResult},
    lms::{LmsApi, LmsError, LmsResult},
    models::{
        course::{Course, CourseId},
        item::{Item, ItemKind, RawAssignment, RawQuiz, SubmissionState},
        user::AccessToken,
    },
    resolver::{assignment_status_text, quiz_status_text, resolve_assignment, resolve_quiz},
    time::{Window, to_local},
};

const COURSE_CONCURRENCY: usize = 4;
const QUIZ_CONCURRENCY: usize = 5;

/// Which items a fetch should return. Quiz submission lookups are only made
/// for quizzes inside the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope {
    All,
    DueWithin(Window),
}

impl FetchScope {
    pub fn admits(&self, due_at: Option<DateTime<FixedOffset>>) -> bool {
        match self {
            FetchScope::All => true,
            FetchScope::DueWithin(window) => due_at.is_some_and(|due| window.contains(due)),
        }
    }
}

pub struct ItemFetcher {
    lms: Arc<dyn LmsApi>,
}

impl ItemFetcher {
    pub fn new(lms: Arc<dyn LmsApi>) -> Self {
        Self { lms }
    }

    /// Fetch every in-scope item across `courses`. A course whose listing
    /// fails with anything other than 403/404 fails the whole fetch.
    pub async fn fetch(
        &self,
        token: &AccessToken,
        courses: &[Course],
        scope: FetchScope,
    ) -> BotResult<Vec<Item>> {
        // Collected up front: a borrowing closure inside the combinator makes
        // this future !Send.
        let fetches: Vec<_> = courses
            .iter()
            .map(|course| self.fetch_course(token, course, scope))
            .collect();
        let per_course: Vec<Vec<Item>> = stream::iter(fetches)
            .buffer_unordered(COURSE_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(per_course.into_iter().flatten().collect())
    }

    async fn fetch_course(
        &self,
        token: &AccessToken,
        course: &Course,
        scope: FetchScope,
    ) -> BotResult<Vec<Item>> {
        let (assignments, quizzes) = tokio::join!(
            self.lms.list_assignments(token, course.id),
            self.lms.list_quizzes(token, course.id),
        );
        let assignments = tolerate_unsupported(assignments, course.id, "assignments")?;
        let quizzes = tolerate_unsupported(quizzes, course.id, "quizzes")?;

        let mut items: Vec<Item> = assignments
            .into_iter()
            .map(|raw| assignment_item(course, raw))
            .filter(|item| scope.admits(item.due_at))
            .collect();

        let quizzes: Vec<RawQuiz> = quizzes
            .into_iter()
            .filter(|quiz| scope.admits(quiz.due_at.map(to_local)))
            .collect();

        let lookups: Vec<_> = quizzes
            .into_iter()
            .map(|quiz| self.quiz_item_with_state(token, course, quiz))
            .collect();
        let quiz_items: Vec<Item> = stream::iter(lookups)
            .buffered(QUIZ_CONCURRENCY)
            .try_collect()
            .await?;

        items.extend(quiz_items);
        debug!(course_id = course.id, count = items.len(), "Fetched course items");
        Ok(items)
    }

    async fn quiz_item_with_state(
        &self,
        token: &AccessToken,
        course: &Course,
        quiz: RawQuiz,
    ) -> BotResult<Item> {
        let state = self.quiz_state(token, course.id, &quiz).await?;
        Ok(quiz_item(course, quiz, state))
    }

    async fn quiz_state(
        &self,
        token: &AccessToken,
        course_id: CourseId,
        quiz: &RawQuiz,
    ) -> BotResult<SubmissionState> {
        match self.lms.quiz_submission(token, course_id, quiz.id).await {
            Ok(submission) => Ok(resolve_quiz(submission.as_ref())),
            Err(LmsError::AuthExpired) => Err(BotError::AuthExpired),
            Err(err) => {
                debug!(course_id, quiz_id = quiz.id, error = %err, "Quiz submission lookup failed");
                Ok(SubmissionState::NotSubmitted)
            }
        }
    }
}

/// Hidden or disabled tools (403/404) yield no items for that course.
fn tolerate_unsupported<T>(
    result: LmsResult<Vec<T>>,
    course_id: CourseId,
    what: &str,
) -> BotResult<Vec<T>> {
    match result {
        Ok(records) => Ok(records),
        Err(LmsError::Unsupported(reason)) => {
            warn!(course_id, what, %reason, "LMS listing unsupported for course");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn assignment_item(course: &Course, raw: RawAssignment) -> Item {
    let submission = resolve_assignment(&raw);
    let status_text = assignment_status_text(&raw);
    Item {
        id: raw.id,
        course_id: course.id,
        course_name: course.name.clone(),
        kind: ItemKind::Assignment,
        title: raw.name,
        due_at: raw.due_at.map(to_local),
        html_url: raw.html_url,
        points_possible: raw.points_possible,
        submission,
        status_text,
    }
}

pub fn quiz_item(course: &Course, raw: RawQuiz, submission: SubmissionState) -> Item {
    Item {
        id: raw.id,
        course_id: course.id,
        course_name: course.name.clone(),
        kind: ItemKind::Quiz,
        title: raw.title,
        due_at: raw.due_at.map(to_local),
        html_url: raw.html_url,
        points_possible: raw.points_possible,
        submission,
        status_text: quiz_status_text(submission),
    }
}
