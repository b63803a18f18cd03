//! Contract for the remote LMS. The Canvas implementation lives in
//! `duebot-canvas`; tests use the generated `MockLmsApi`.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    errors::BotError,
    models::{
        course::{Course, CourseId, RawFile, RawFolder},
        item::{ItemId, RawAssignment, RawQuiz, RawQuizSubmission},
        user::AccessToken,
    },
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LmsError {
    /// 401 from the LMS.
    #[error("LMS rejected the access token")]
    AuthExpired,

    /// 403 or 404: the endpoint is disabled or hidden for this course.
    #[error("LMS resource unsupported: {0}")]
    Unsupported(String),

    #[error("LMS unavailable: {0}")]
    Unavailable(String),
}

impl From<LmsError> for BotError {
    fn from(err: LmsError) -> Self {
        match err {
            LmsError::AuthExpired => BotError::AuthExpired,
            LmsError::Unsupported(what) | LmsError::Unavailable(what) => {
                BotError::RemoteUnavailable(what)
            }
        }
    }
}

pub type LmsResult<T> = Result<T, LmsError>;

#[automock]
#[async_trait]
pub trait LmsApi: Send + Sync {
    async fn list_active_courses(&self, token: &AccessToken) -> LmsResult<Vec<Course>>;

    async fn list_assignments(
        &self,
        token: &AccessToken,
        course_id: CourseId,
    ) -> LmsResult<Vec<RawAssignment>>;

    async fn list_quizzes(&self, token: &AccessToken, course_id: CourseId)
    -> LmsResult<Vec<RawQuiz>>;

    /// The caller's own submission for a quiz, if one exists.
    async fn quiz_submission(
        &self,
        token: &AccessToken,
        course_id: CourseId,
        quiz_id: ItemId,
    ) -> LmsResult<Option<RawQuizSubmission>>;

    async fn root_folder(&self, token: &AccessToken, course_id: CourseId) -> LmsResult<RawFolder>;

    async fn subfolders(&self, token: &AccessToken, folder_id: i64) -> LmsResult<Vec<RawFolder>>;

    async fn folder_files(&self, token: &AccessToken, folder_id: i64) -> LmsResult<Vec<RawFile>>;

    /// Browser link to a course file.
    fn file_url(&self, course_id: CourseId, file_id: i64) -> String;
}
