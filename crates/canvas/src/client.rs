use std::time::Duration;

use async_trait::async_trait;
use duebot_core::{
    lms::{LmsApi, LmsError, LmsResult},
    models::{
        course::{Course, CourseId, RawFile, RawFolder},
        item::{ItemId, RawAssignment, RawQuiz, RawQuizSubmission},
        user::AccessToken,
    },
};
use eyre::{Result, eyre};
use reqwest::{RequestBuilder, Response, StatusCode, header::LINK};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::pagination::{MAX_PAGES, PER_PAGE, RATE_LIMIT_PAUSE, next_link, should_throttle};

/// Trim and validate a configured Canvas base URL. Only https is accepted
/// and a trailing slash is removed.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with("https://") || trimmed.len() <= "https://".len() {
        return Err(eyre!("Canvas base URL must be an https URL, got {trimmed:?}"));
    }
    Ok(trimmed.to_string())
}

#[derive(Deserialize)]
struct CanvasCourse {
    id: CourseId,
    name: Option<String>,
}

#[derive(Deserialize)]
struct QuizSubmissionPage {
    #[serde(default)]
    quiz_submissions: Vec<RawQuizSubmission>,
}

/// Canvas REST client. Every call authenticates with the caller's own token.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    base_url: String,
}

impl CanvasClient {
    /// `base_url` is used as given; run it through [`normalize_base_url`] when
    /// it comes from configuration.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("duebot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authed(&self, url: &str, token: &AccessToken) -> RequestBuilder {
        self.http.get(url).bearer_auth(token.expose())
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &AccessToken, path: &str) -> LmsResult<T> {
        let response = self
            .authed(&self.endpoint(path), token)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(response, path)?;
        response.json().await.map_err(|err| decode(path, err))
    }

    /// Follow `rel="next"` links until exhausted or the page cap is hit.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
        query: &[(&str, &str)],
    ) -> LmsResult<Vec<T>> {
        let mut request = self
            .authed(&self.endpoint(path), token)
            .query(query)
            .query(&[("per_page", PER_PAGE)]);
        let mut results = Vec::new();

        for page in 1..=MAX_PAGES {
            let response = request.send().await.map_err(transport)?;
            let response = check_status(response, path)?;

            let next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link);
            let throttled = should_throttle(response.headers());

            let batch: Vec<T> = response.json().await.map_err(|err| decode(path, err))?;
            results.extend(batch);

            let Some(next) = next else {
                return Ok(results);
            };
            if page == MAX_PAGES {
                warn!(path, pages = MAX_PAGES, "Pagination cap reached, results truncated");
                break;
            }
            if throttled {
                debug!(path, "Rate limit running low, pausing");
                tokio::time::sleep(RATE_LIMIT_PAUSE).await;
            }
            request = self.authed(&next, token);
        }

        Ok(results)
    }
}

fn classify(status: StatusCode, path: &str) -> Option<LmsError> {
    match status {
        s if s.is_success() => None,
        StatusCode::UNAUTHORIZED => Some(LmsError::AuthExpired),
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            Some(LmsError::Unsupported(format!("{path} returned {}", status.as_u16())))
        }
        _ => Some(LmsError::Unavailable(format!("{path} returned {}", status.as_u16()))),
    }
}

fn check_status(response: Response, path: &str) -> LmsResult<Response> {
    match classify(response.status(), path) {
        None => Ok(response),
        Some(err) => Err(err),
    }
}

// The token travels in a header, so the error text never contains it.
fn transport(err: reqwest::Error) -> LmsError {
    if err.is_timeout() {
        LmsError::Unavailable("request timed out".to_string())
    } else {
        LmsError::Unavailable(format!("request failed: {}", err.without_url()))
    }
}

fn decode(path: &str, err: reqwest::Error) -> LmsError {
    LmsError::Unavailable(format!("unexpected response from {path}: {}", err.without_url()))
}

#[async_trait]
impl LmsApi for CanvasClient {
    async fn list_active_courses(&self, token: &AccessToken) -> LmsResult<Vec<Course>> {
        let courses: Vec<CanvasCourse> = self
            .get_paginated(
                token,
                "/courses",
                &[("enrollment_state", "active"), ("state[]", "available")],
            )
            .await?;

        Ok(courses
            .into_iter()
            .filter_map(|c| match c.name {
                Some(name) if !name.trim().is_empty() => Some(Course { id: c.id, name }),
                _ => None,
            })
            .collect())
    }

    async fn list_assignments(
        &self,
        token: &AccessToken,
        course_id: CourseId,
    ) -> LmsResult<Vec<RawAssignment>> {
        self.get_paginated(
            token,
            &format!("/courses/{course_id}/assignments"),
            &[("include[]", "submission"), ("order_by", "due_at")],
        )
        .await
    }

    async fn list_quizzes(
        &self,
        token: &AccessToken,
        course_id: CourseId,
    ) -> LmsResult<Vec<RawQuiz>> {
        self.get_paginated(token, &format!("/courses/{course_id}/quizzes"), &[])
            .await
    }

    async fn quiz_submission(
        &self,
        token: &AccessToken,
        course_id: CourseId,
        quiz_id: ItemId,
    ) -> LmsResult<Option<RawQuizSubmission>> {
        let page: QuizSubmissionPage = self
            .get_json(token, &format!("/courses/{course_id}/quizzes/{quiz_id}/submissions"))
            .await?;
        Ok(page.quiz_submissions.into_iter().next())
    }

    async fn root_folder(&self, token: &AccessToken, course_id: CourseId) -> LmsResult<RawFolder> {
        self.get_json(token, &format!("/courses/{course_id}/folders/root"))
            .await
    }

    async fn subfolders(&self, token: &AccessToken, folder_id: i64) -> LmsResult<Vec<RawFolder>> {
        self.get_paginated(token, &format!("/folders/{folder_id}/folders"), &[])
            .await
    }

    async fn folder_files(&self, token: &AccessToken, folder_id: i64) -> LmsResult<Vec<RawFile>> {
        self.get_paginated(token, &format!("/folders/{folder_id}/files"), &[])
            .await
    }

    fn file_url(&self, course_id: CourseId, file_id: i64) -> String {
        format!("{}/courses/{course_id}/files/{file_id}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("https://canvas.nus.edu.sg", "https://canvas.nus.edu.sg")]
    #[case("  https://canvas.nus.edu.sg/ ", "https://canvas.nus.edu.sg")]
    #[case("https://lms.example.edu//", "https://lms.example.edu")]
    fn test_normalize_base_url(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_base_url(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("http://canvas.nus.edu.sg")]
    #[case("canvas.nus.edu.sg")]
    #[case("https://")]
    #[case("")]
    fn test_normalize_rejects_non_https(#[case] raw: &str) {
        assert!(normalize_base_url(raw).is_err());
    }

    #[rstest]
    #[case(StatusCode::OK, None)]
    #[case(StatusCode::UNAUTHORIZED, Some(LmsError::AuthExpired))]
    #[case(
        StatusCode::FORBIDDEN,
        Some(LmsError::Unsupported("/x returned 403".to_string()))
    )]
    #[case(
        StatusCode::NOT_FOUND,
        Some(LmsError::Unsupported("/x returned 404".to_string()))
    )]
    #[case(
        StatusCode::SERVICE_UNAVAILABLE,
        Some(LmsError::Unavailable("/x returned 503".to_string()))
    )]
    #[case(
        StatusCode::TOO_MANY_REQUESTS,
        Some(LmsError::Unavailable("/x returned 429".to_string()))
    )]
    fn test_status_classification(#[case] status: StatusCode, #[case] expected: Option<LmsError>) {
        assert_eq!(classify(status, "/x"), expected);
    }

    #[test]
    fn test_file_url() {
        let client =
            CanvasClient::new("https://canvas.nus.edu.sg/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.file_url(7, 99),
            "https://canvas.nus.edu.sg/courses/7/files/99"
        );
    }
}
