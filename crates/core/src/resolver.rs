//! Decides whether the user actually handed an item in.
//!
//! The LMS returns a submission placeholder for every assignment, including
//! ones an instructor graded without any student work. Only a positive
//! attempt count counts as a submission.

use crate::models::item::{RawAssignment, RawQuizSubmission, RawSubmission, SubmissionState};

const SUBMITTED_STATES: [&str; 3] = ["submitted", "graded", "pending_review"];
const QUIZ_DONE_STATES: [&str; 2] = ["complete", "pending_review"];
const NON_SUBMITTABLE_TYPES: [&str; 3] = ["none", "not_graded", "on_paper"];

fn has_attempt(attempt: Option<u32>) -> bool {
    attempt.is_some_and(|n| n > 0)
}

fn is_non_submittable(raw: &RawAssignment) -> bool {
    !raw.submission_types.is_empty()
        && raw
            .submission_types
            .iter()
            .all(|t| NON_SUBMITTABLE_TYPES.contains(&t.as_str()))
}

pub fn resolve_assignment(raw: &RawAssignment) -> SubmissionState {
    let submitted = raw.submission.as_ref().is_some_and(|sub| {
        SUBMITTED_STATES.contains(&sub.workflow_state.as_str()) && has_attempt(sub.attempt)
    });

    if submitted {
        SubmissionState::Submitted
    } else if is_non_submittable(raw) {
        SubmissionState::NotApplicable
    } else {
        SubmissionState::NotSubmitted
    }
}

pub fn resolve_quiz(submission: Option<&RawQuizSubmission>) -> SubmissionState {
    match submission {
        Some(sub)
            if QUIZ_DONE_STATES.contains(&sub.workflow_state.as_str())
                && has_attempt(sub.attempt) =>
        {
            SubmissionState::Submitted
        }
        _ => SubmissionState::NotSubmitted,
    }
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{score}")
    }
}

fn submission_text(sub: &RawSubmission) -> String {
    let attempted = has_attempt(sub.attempt);
    match sub.workflow_state.as_str() {
        "graded" if attempted => match sub.score {
            Some(score) => format!("Graded ({} pts)", format_score(score)),
            None => "Graded".to_string(),
        },
        // Instructor entered a grade without any student work.
        "graded" => match sub.score {
            Some(score) => format!("Graded, no submission ({} pts)", format_score(score)),
            None => "Not submitted".to_string(),
        },
        "submitted" if attempted => "Submitted".to_string(),
        "pending_review" if attempted => "Pending review".to_string(),
        _ => "Not submitted".to_string(),
    }
}

/// Human-readable status for an assignment detail view.
pub fn assignment_status_text(raw: &RawAssignment) -> String {
    match (&raw.submission, resolve_assignment(raw)) {
        (_, SubmissionState::NotApplicable) => "No submission required".to_string(),
        (Some(sub), _) => submission_text(sub),
        (None, _) => "Not submitted".to_string(),
    }
}

pub fn quiz_status_text(state: SubmissionState) -> String {
    match state {
        SubmissionState::Submitted => "Complete".to_string(),
        SubmissionState::NotApplicable => "No submission required".to_string(),
        SubmissionState::NotSubmitted => "Not taken".to_string(),
    }
}
