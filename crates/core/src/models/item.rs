use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::course::CourseId;

pub type ItemId = i64;

/// Assignment record as returned by the LMS (with `include[]=submission`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAssignment {
    pub id: ItemId,
    pub name: String,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: String,
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub submission_types: Vec<String>,
    pub submission: Option<RawSubmission>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default = "unsubmitted")]
    pub workflow_state: String,
    pub attempt: Option<u32>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuiz {
    pub id: ItemId,
    #[serde(default = "untitled_quiz")]
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: String,
    pub points_possible: Option<f64>,
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuizSubmission {
    #[serde(default = "unsubmitted")]
    pub workflow_state: String,
    pub attempt: Option<u32>,
    pub score: Option<f64>,
}

fn unsubmitted() -> String {
    "unsubmitted".to_string()
}

fn untitled_quiz() -> String {
    "Untitled Quiz".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Assignment,
    Quiz,
}

impl ItemKind {
    /// Marker shown next to the item title.
    pub fn marker(self) -> &'static str {
        match self {
            ItemKind::Assignment => "[A]",
            ItemKind::Quiz => "[Q]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionState {
    NotSubmitted,
    Submitted,
    NotApplicable,
}

impl SubmissionState {
    pub fn is_submitted(self) -> bool {
        self == SubmissionState::Submitted
    }
}

/// Assignment or quiz normalized into one shape. `due_at` is already in the
/// local (UTC+8) zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub course_id: CourseId,
    pub course_name: String,
    pub kind: ItemKind,
    pub title: String,
    pub due_at: Option<DateTime<FixedOffset>>,
    pub html_url: String,
    pub points_possible: Option<f64>,
    pub submission: SubmissionState,
    pub status_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_assignment_from_lms_json() {
        let json = r#"{
            "id": 42,
            "name": "Lab 3",
            "due_at": "2026-03-01T15:59:00Z",
            "html_url": "https://canvas.example.edu/courses/7/assignments/42",
            "points_possible": 10.0,
            "submission_types": ["online_upload"],
            "submission": {"workflow_state": "unsubmitted", "attempt": null, "score": null}
        }"#;

        let raw: RawAssignment = serde_json::from_str(json).expect("Failed to parse assignment");
        assert_eq!(raw.id, 42);
        assert_eq!(raw.submission.unwrap().attempt, None);
        assert_eq!(raw.due_at.unwrap().to_rfc3339(), "2026-03-01T15:59:00+00:00");
    }

    #[test]
    fn test_raw_quiz_defaults() {
        let raw: RawQuiz = serde_json::from_str(r#"{"id": 5, "due_at": null}"#).unwrap();
        assert_eq!(raw.title, "Untitled Quiz");
        assert!(raw.html_url.is_empty());
    }

    #[test]
    fn test_kind_markers() {
        assert_eq!(ItemKind::Assignment.marker(), "[A]");
        assert_eq!(ItemKind::Quiz.marker(), "[Q]");
    }
}
